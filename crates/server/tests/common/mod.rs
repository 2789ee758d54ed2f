//! Scripted collaborators and request helpers shared by the API tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use fpbridge::{
    DriverError, Extracted, RawImage, Scanner, ScannerDriver, Template, TemplateMatcher,
};
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_app, ServerConfig, ServerState};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tower::ServiceExt;

/// Counters shared between a scripted scanner and the test.
#[derive(Default)]
pub struct Probe {
    pub captures: AtomicUsize,
    pub in_flight: AtomicBool,
    pub overlaps: AtomicUsize,
}

/// Scanner whose n-th capture yields template `[n; 32]`. Flags any call that
/// arrives while another capture sequence is still running.
pub struct ScriptedScanner {
    probe: Arc<Probe>,
    delay: Duration,
    fail_buffer: bool,
    current: u8,
}

impl Scanner for ScriptedScanner {
    fn id(&self) -> &str {
        "scripted-0"
    }

    fn capture_image(&mut self) -> Result<(), DriverError> {
        if self.probe.in_flight.swap(true, Ordering::SeqCst) {
            self.probe.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(self.delay);
        let n = self.probe.captures.fetch_add(1, Ordering::SeqCst) + 1;
        self.current = n as u8;
        Ok(())
    }

    fn image_buffer(&mut self) -> Result<RawImage, DriverError> {
        if self.fail_buffer {
            self.probe.in_flight.store(false, Ordering::SeqCst);
            return Err(DriverError::new(-211, "buffer timeout"));
        }
        Ok(RawImage {
            pixels: vec![self.current],
            width: 1,
            height: 1,
            resolution: 500,
        })
    }

    fn extract(&mut self, image: &RawImage) -> Result<Extracted, DriverError> {
        thread::sleep(self.delay);
        self.probe.in_flight.store(false, Ordering::SeqCst);
        Ok(Extracted {
            template: Template::new(vec![image.pixels[0]; 32]),
            quality: 90,
        })
    }
}

pub struct ScriptedDriver {
    pub probe: Arc<Probe>,
    pub delay: Duration,
    pub fail_buffer: bool,
    pub attached: bool,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self {
            probe: Arc::new(Probe::default()),
            delay: Duration::ZERO,
            fail_buffer: false,
            attached: true,
        }
    }
}

impl ScannerDriver for ScriptedDriver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn enumerate(&self) -> Result<Vec<Box<dyn Scanner>>, DriverError> {
        if !self.attached {
            return Ok(Vec::new());
        }
        Ok(vec![Box::new(ScriptedScanner {
            probe: Arc::clone(&self.probe),
            delay: self.delay,
            fail_buffer: self.fail_buffer,
            current: 0,
        })])
    }
}

/// Matcher that records its inputs and matches on byte equality.
#[derive(Default)]
pub struct RecordingMatcher {
    pub calls: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
    pub panic_on_call: bool,
}

impl RecordingMatcher {
    pub fn calls(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TemplateMatcher for RecordingMatcher {
    fn verify(&self, reference: &[u8], probe: &[u8]) -> Result<bool, DriverError> {
        if self.panic_on_call {
            panic!("matcher crashed");
        }
        self.calls
            .lock()
            .unwrap()
            .push((reference.to_vec(), probe.to_vec()));
        Ok(reference == probe)
    }
}

pub fn state_with(driver: &ScriptedDriver, matcher: Arc<RecordingMatcher>) -> Arc<ServerState> {
    Arc::new(ServerState::with_collaborators(
        ServerConfig::default(),
        driver,
        matcher,
    ))
}

/// Send one request through the full app and decode the JSON body, if any.
pub async fn send(
    state: &Arc<ServerState>,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, axum::http::HeaderMap, Option<Value>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = build_app(Arc::clone(state)).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };
    (status, headers, json)
}
