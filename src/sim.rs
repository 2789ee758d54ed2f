//! Simulated collaborators.
//!
//! `SimulatedDriver` exposes scanners that "see" the same finger on every
//! capture, with a little per-capture noise, and `SimulatedMatcher` accepts
//! two templates when enough of their bytes agree. Together they let the
//! service run end to end on a machine without a sensor.

use std::thread;
use std::time::Duration;

use crate::driver::{Scanner, ScannerDriver, TemplateMatcher};
use crate::error::DriverError;
use crate::template::{Extracted, RawImage, Template};

const TEMPLATE_LEN: usize = 384;
const NOISY_BYTES_PER_CAPTURE: usize = 8;
const IMAGE_WIDTH: u32 = 320;
const IMAGE_HEIGHT: u32 = 480;
const IMAGE_RESOLUTION: u32 = 500;

/// Driver backed by in-process fake scanners.
#[derive(Debug, Clone)]
pub struct SimulatedDriver {
    /// Number of scanners reported by enumeration.
    pub scanners: usize,
    /// Time each capture waits, standing in for the user placing a finger.
    pub capture_delay: Duration,
    /// Identity of the simulated finger; equal seeds produce matching templates.
    pub finger_seed: u64,
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self {
            scanners: 1,
            capture_delay: Duration::ZERO,
            finger_seed: 1,
        }
    }
}

impl ScannerDriver for SimulatedDriver {
    fn name(&self) -> &str {
        "simulated"
    }

    fn enumerate(&self) -> Result<Vec<Box<dyn Scanner>>, DriverError> {
        Ok((0..self.scanners)
            .map(|index| {
                Box::new(SimulatedScanner::new(
                    format!("SIM-{index:04}"),
                    self.finger_seed,
                    self.capture_delay,
                )) as Box<dyn Scanner>
            })
            .collect())
    }
}

/// Driver that never finds a scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedDriver;

impl ScannerDriver for DetachedDriver {
    fn name(&self) -> &str {
        "detached"
    }

    fn enumerate(&self) -> Result<Vec<Box<dyn Scanner>>, DriverError> {
        Ok(Vec::new())
    }
}

#[derive(Debug)]
pub struct SimulatedScanner {
    id: String,
    base: Vec<u8>,
    capture_delay: Duration,
    captures: u64,
    pending_image: bool,
    released: bool,
}

impl SimulatedScanner {
    pub fn new(id: impl Into<String>, finger_seed: u64, capture_delay: Duration) -> Self {
        Self {
            id: id.into(),
            base: finger_bytes(finger_seed),
            capture_delay,
            captures: 0,
            pending_image: false,
            released: false,
        }
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.released {
            Err(DriverError::new(-101, "scanner handle released"))
        } else {
            Ok(())
        }
    }
}

impl Scanner for SimulatedScanner {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture_image(&mut self) -> Result<(), DriverError> {
        self.ensure_open()?;
        if !self.capture_delay.is_zero() {
            thread::sleep(self.capture_delay);
        }
        self.captures += 1;
        self.pending_image = true;
        Ok(())
    }

    fn image_buffer(&mut self) -> Result<RawImage, DriverError> {
        self.ensure_open()?;
        if !std::mem::take(&mut self.pending_image) {
            return Err(DriverError::new(-211, "no captured image"));
        }

        // The image content is irrelevant to extraction here; only its shape
        // and the capture counter travel through.
        let mut pixels = vec![0u8; (IMAGE_WIDTH * IMAGE_HEIGHT) as usize];
        pixels[..8].copy_from_slice(&self.captures.to_le_bytes());
        Ok(RawImage {
            pixels,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            resolution: IMAGE_RESOLUTION,
        })
    }

    fn extract(&mut self, image: &RawImage) -> Result<Extracted, DriverError> {
        self.ensure_open()?;
        let counter = image
            .pixels
            .get(..8)
            .and_then(|bytes| bytes.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or_else(|| DriverError::new(-301, "image too small"))?;

        let mut template = self.base.clone();
        let mut state = counter.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1;
        for _ in 0..NOISY_BYTES_PER_CAPTURE {
            state = xorshift(state);
            let position = (state % TEMPLATE_LEN as u64) as usize;
            template[position] ^= 0x5a;
        }

        Ok(Extracted {
            template: Template::new(template),
            quality: 60 + (counter % 40) as u8,
        })
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Byte-agreement matcher.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedMatcher {
    /// Fraction of positions that must agree, in `[0, 1]`.
    pub threshold: f64,
}

impl Default for SimulatedMatcher {
    fn default() -> Self {
        Self { threshold: 0.9 }
    }
}

impl SimulatedMatcher {
    pub fn similarity(reference: &[u8], probe: &[u8]) -> f64 {
        let longest = reference.len().max(probe.len());
        if longest == 0 {
            return 0.0;
        }
        let agreeing = reference
            .iter()
            .zip(probe)
            .filter(|(left, right)| left == right)
            .count();
        agreeing as f64 / longest as f64
    }
}

impl TemplateMatcher for SimulatedMatcher {
    fn verify(&self, reference: &[u8], probe: &[u8]) -> Result<bool, DriverError> {
        if reference.is_empty() || probe.is_empty() {
            return Err(DriverError::new(-302, "invalid template"));
        }
        Ok(Self::similarity(reference, probe) >= self.threshold)
    }
}

fn finger_bytes(seed: u64) -> Vec<u8> {
    // xorshift has no way out of zero.
    let mut state = match splitmix(seed) {
        0 => 0x2545_f491_4f6c_dd1d,
        mixed => mixed,
    };
    (0..TEMPLATE_LEN)
        .map(|_| {
            state = xorshift(state);
            (state >> 24) as u8
        })
        .collect()
}

fn splitmix(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}
