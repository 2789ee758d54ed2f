//! Concurrency and lifecycle tests over a real listener.

mod common;

use axum::http::Method;
use common::{send, state_with, RecordingMatcher, ScriptedDriver};
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_captures_never_overlap() {
    let mut driver = ScriptedDriver::new();
    driver.delay = Duration::from_millis(10);
    let state = state_with(&driver, Arc::new(RecordingMatcher::default()));

    let requests = 12;
    let handles: Vec<_> = (0..requests)
        .map(|i| {
            let state = Arc::clone(&state);
            let method = if i % 2 == 0 { Method::GET } else { Method::POST };
            tokio::spawn(async move { send(&state, method, "/capture", None).await })
        })
        .collect();

    let mut returned = Vec::new();
    for handle in handles {
        let (_, _, body) = handle.await.unwrap();
        let body = body.unwrap();
        assert_eq!(body["success"], Value::Bool(true));
        returned.push(body["data"].as_str().unwrap().to_string());
    }

    assert_eq!(driver.probe.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(driver.probe.captures.load(Ordering::SeqCst), requests);

    // Every capture produced a distinct template.
    returned.sort();
    returned.dedup();
    assert_eq!(returned.len(), requests);

    // The store holds the template of the last capture performed.
    let last = state.store.current().unwrap();
    assert_eq!(last.as_bytes(), &[requests as u8; 32]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_match_and_capture_interleave_safely() {
    let mut driver = ScriptedDriver::new();
    driver.delay = Duration::from_millis(5);
    let matcher = Arc::new(RecordingMatcher::default());
    let state = state_with(&driver, matcher.clone());

    send(&state, Method::GET, "/capture", None).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let state = Arc::clone(&state);
            let path = if i % 2 == 0 { "/capture" } else { "/match" };
            tokio::spawn(async move { send(&state, Method::GET, path, None).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(driver.probe.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(driver.probe.captures.load(Ordering::SeqCst), 9);

    // Every comparison saw a whole template on both sides.
    let calls = matcher.calls();
    assert_eq!(calls.len(), 4);
    for (reference, probe) in calls {
        assert_eq!(reference.len(), 32);
        assert!(reference.iter().all(|b| *b == reference[0]));
        assert_eq!(probe.len(), 32);
    }
}

#[tokio::test]
async fn test_server_serves_and_releases_scanner_on_shutdown() {
    let state = state_with(&ScriptedDriver::new(), Arc::new(RecordingMatcher::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(server::run(listener, Arc::clone(&state), async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{addr}/capture"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], Value::Bool(true));

    let response = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/match"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();

    assert!(!state.session.is_available());
}
