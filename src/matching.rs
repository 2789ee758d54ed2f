use std::sync::Arc;

use crate::driver::TemplateMatcher;
use crate::error::MatchFailure;
use crate::template::MAX_TEMPLATE_LEN;

/// Biometric outcome of a successful comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NotMatched,
}

impl MatchOutcome {
    pub fn is_match(self) -> bool {
        matches!(self, MatchOutcome::Matched)
    }
}

impl From<bool> for MatchOutcome {
    fn from(matched: bool) -> Self {
        if matched {
            MatchOutcome::Matched
        } else {
            MatchOutcome::NotMatched
        }
    }
}

/// Stateless front for the verify collaborator.
///
/// Validates inputs before the collaborator sees them and maps its status
/// codes into [`MatchFailure`]. Results are never cached.
#[derive(Clone)]
pub struct MatchEngine {
    matcher: Arc<dyn TemplateMatcher>,
}

impl MatchEngine {
    pub fn new(matcher: Arc<dyn TemplateMatcher>) -> Self {
        Self { matcher }
    }

    /// Compare a live or incoming `probe` against a stored `reference`.
    ///
    /// The argument order is passed through unchanged; matchers are calibrated
    /// with the enrolled template first.
    pub fn verify(&self, reference: &[u8], probe: &[u8]) -> Result<MatchOutcome, MatchFailure> {
        check_input("reference", reference)?;
        check_input("probe", probe)?;

        match self.matcher.verify(reference, probe) {
            Ok(matched) => Ok(MatchOutcome::from(matched)),
            Err(err) => {
                tracing::warn!(code = err.code, error = %err, "matcher rejected templates");
                Err(MatchFailure::EngineError(err.code))
            }
        }
    }
}

fn check_input(role: &str, template: &[u8]) -> Result<(), MatchFailure> {
    if template.is_empty() {
        return Err(MatchFailure::InvalidInput(format!("{role} template is empty")));
    }
    if template.len() > MAX_TEMPLATE_LEN {
        return Err(MatchFailure::InvalidInput(format!(
            "{role} template is {} bytes, limit is {MAX_TEMPLATE_LEN}",
            template.len()
        )));
    }
    Ok(())
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine").finish_non_exhaustive()
    }
}
