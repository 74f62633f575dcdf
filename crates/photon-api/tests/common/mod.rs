//! Shared helpers for Photon API integration tests.

#![allow(dead_code)]

use photon_api::{ClientOptions, PhotonClient, PhotonClientBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

const NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Deterministic generator for test resource names.
pub fn test_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random name with a fixed prefix, drawn from `rng`.
pub fn random_name(rng: &mut StdRng, prefix: &str, len: usize) -> String {
    let suffix: String = (0..len)
        .map(|_| char::from(NAME_CHARSET[rng.random_range(0..NAME_CHARSET.len())]))
        .collect();
    format!("{prefix}{suffix}")
}

/// Random IPv4 address in 10.0.0.0/8.
pub fn random_address(rng: &mut StdRng) -> String {
    format!(
        "10.{}.{}.{}",
        rng.random_range(0..=255u8),
        rng.random_range(0..=255u8),
        rng.random_range(1..=254u8)
    )
}

/// Client against `server` that polls quickly.
pub fn fast_client(server: &MockServer) -> PhotonClient {
    let options = ClientOptions::new(server.uri())
        .unwrap()
        .with_task_poll_interval(Duration::from_millis(10))
        .with_task_poll_max_interval(Duration::from_millis(10));
    PhotonClientBuilder::from_options(options).build().unwrap()
}

/// Task envelope as the service returns it.
pub fn task_json(id: &str, operation: &str, state: &str) -> Value {
    json!({
        "id": id,
        "operation": operation,
        "state": state,
        "entity": {"id": "dep-1", "kind": "deployment"},
        "steps": [],
        "selfLink": format!("/tasks/{id}")
    })
}

/// Load a JSON fixture from `tests/fixtures`.
pub fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap()
}

/// Answers successive polls with successive states, repeating the last one.
pub struct TaskSequence {
    id: String,
    operation: String,
    states: Vec<&'static str>,
    calls: AtomicUsize,
}

impl TaskSequence {
    pub fn new(id: &str, operation: &str, states: &[&'static str]) -> Self {
        Self {
            id: id.to_string(),
            operation: operation.to_string(),
            states: states.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for TaskSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.states[n.min(self.states.len() - 1)];
        ResponseTemplate::new(200).set_body_json(task_json(&self.id, &self.operation, state))
    }
}

/// Returns the request body unchanged.
pub struct Echo;

impl Respond for Echo {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "application/json")
            .set_body_bytes(request.body.clone())
    }
}
