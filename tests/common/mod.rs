//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use sheetsync::config::Settings;
use sheetsync::dispatch::{Endpoint, FormPayload, Transport, TransportError, TransportResponse};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What a [`ScriptedTransport`] does for one submission
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Refused,
    Hang,
}

/// In-memory transport replying per value of one payload field
///
/// Submissions whose field value has no script get `200 OK` after the
/// default delay.
pub struct ScriptedTransport {
    field: String,
    replies: HashMap<String, (Duration, Reply)>,
    default_delay: Duration,
    submitted: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn keyed_by(field: &str) -> Self {
        Self {
            field: field.to_string(),
            replies: HashMap::new(),
            default_delay: Duration::from_millis(1),
            submitted: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reply(mut self, value: &str, delay: Duration, reply: Reply) -> Self {
        self.replies.insert(value.to_string(), (delay, reply));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(path_and_query, encoded body)` of every submission, in arrival order
    pub fn submitted(&self) -> Vec<(String, String)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(
        &self,
        endpoint: &Endpoint,
        payload: &FormPayload,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .unwrap()
            .push((endpoint.path_and_query(), payload.encode()));

        let value = payload.get(&self.field).unwrap_or_default();
        let (delay, reply) = self
            .replies
            .get(value)
            .cloned()
            .unwrap_or((self.default_delay, Reply::Status(200, "OK".to_string())));

        tokio::time::sleep(delay).await;
        match reply {
            Reply::Status(status, body) => Ok(TransportResponse::new(status, body)),
            Reply::Refused => Err(TransportError::Connect("connection refused".to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(TransportResponse::new(200, ""))
            }
        }
    }
}

/// Settings with the always-required keys plus `extra`
pub fn settings(extra: &[(&str, &str)]) -> Settings {
    let mut settings =
        Settings::from_pairs([("PRIMARY_SERVER", "acme"), ("AUTH_COOKIE", "JSESSIONID=abc")]);
    for (key, value) in extra {
        settings.insert(*key, *value);
    }
    settings
}

/// Write `contents` to `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
