use crate::config::{Backend, ServerConfig};
use crate::error::ServerResult;
use fpbridge::sim::{DetachedDriver, SimulatedDriver, SimulatedMatcher};
use fpbridge::{
    DeviceSession, MatchEngine, ScannerDriver, SessionOptions, TemplateMatcher, TemplateStore,
};
use std::sync::Arc;

/// Shared application state
///
/// Handlers keep no state of their own; everything shared between requests
/// lives behind these handles.
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Exclusive owner of the scanner
    pub session: Arc<DeviceSession>,

    /// Most recently captured template
    pub store: Arc<TemplateStore>,

    /// Template verification
    pub engine: MatchEngine,
}

impl ServerState {
    /// Create state with the collaborators selected by `config.device.backend`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let device = &config.device;
        let driver: Box<dyn ScannerDriver> = match device.backend {
            Backend::Simulated => Box::new(SimulatedDriver {
                scanners: 1,
                capture_delay: device.capture_delay(),
                finger_seed: device.finger_seed,
            }),
            Backend::Detached => Box::new(DetachedDriver),
        };
        let matcher = Arc::new(SimulatedMatcher {
            threshold: device.match_threshold,
        });

        Ok(Self::with_collaborators(config, &*driver, matcher))
    }

    /// Create state around caller-supplied collaborators.
    pub fn with_collaborators(
        config: ServerConfig,
        driver: &dyn ScannerDriver,
        matcher: Arc<dyn TemplateMatcher>,
    ) -> Self {
        let options = SessionOptions {
            min_quality: config.device.min_quality,
        };

        Self {
            session: Arc::new(DeviceSession::initialize(driver, options)),
            store: Arc::new(TemplateStore::new()),
            engine: MatchEngine::new(matcher),
            config: Arc::new(config),
        }
    }

    /// Release the scanner. In-flight captures finish first.
    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}
