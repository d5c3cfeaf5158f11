use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Wait limit for one backend round trip. When it elapses the in-flight
/// request is dropped and the submission resolves through the failure path.
pub const REQUEST_BOUND: Duration = Duration::from_millis(15_000);

/// Single message shown for every flavor of backend failure: bad status,
/// malformed body, network error, or the bound elapsing.
pub const UNAVAILABLE_MESSAGE: &str =
    "⚠️ Unable to connect to backend. Please check server status.";

/// Parsed reply from the /ask endpoint. Every field is optional on the wire;
/// absent fields stay absent so the renderer never fabricates badges or
/// indicators the server didn't send. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub intents: Option<Vec<String>>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

impl ResponseEnvelope {
    /// Synthesized reply used whenever the transport call fails.
    pub fn unavailable() -> Self {
        Self {
            answer: Some(UNAVAILABLE_MESSAGE.to_string()),
            intents: None,
            latency_ms: None,
            sources: None,
        }
    }

    /// A missing answer renders as empty text rather than an error.
    pub fn answer_text(&self) -> &str {
        self.answer.as_deref().unwrap_or_default()
    }
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    User(String),
    Assistant(ResponseEnvelope),
}

/// Display bucket for a server-side intent label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Products,
    Policies,
    Orders,
    Other,
}

/// Map an intent label to its display bucket. Total: labels the server
/// starts emitting later land in `Other` without a client update.
pub fn classify_intent(label: &str) -> Intent {
    match label {
        "products" => Intent::Products,
        "policies" => Intent::Policies,
        "orders" => Intent::Orders,
        _ => Intent::Other,
    }
}

/// Severity band for a reported backend latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBand {
    Fast,
    Moderate,
    Slow,
}

/// Half-open bands: 999 is fast, 1000 and 1999 are moderate, 2000 is slow.
pub fn classify_latency(ms: u64) -> LatencyBand {
    if ms < 1000 {
        LatencyBand::Fast
    } else if ms < 2000 {
        LatencyBand::Moderate
    } else {
        LatencyBand::Slow
    }
}

/// Conversation state for one run of the client: the append-only log, the
/// draft being edited, and the single guard that serializes submissions.
/// Past turns are never reordered or rewritten.
#[derive(Debug, Default)]
pub struct Session {
    pub log: Vec<Turn>,
    pub draft: String,
    pending: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a transport call is outstanding. This flag is the only
    /// thing gating new submissions.
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// Start a submission from the current draft. Appends the user turn and
    /// raises the pending guard, returning the query for the transport call.
    /// A blank draft or an outstanding request makes this a silent no-op:
    /// no turn is appended and nothing must be sent.
    ///
    /// The user turn goes into the log before any network activity, so the
    /// question stays visible even when the backend is down.
    pub fn submit(&mut self) -> Option<String> {
        if self.draft.trim().is_empty() || self.pending {
            return None;
        }
        let query = std::mem::take(&mut self.draft);
        self.log.push(Turn::User(query.clone()));
        self.pending = true;
        Some(query)
    }

    /// Fold the outcome of the transport call into the log: exactly one
    /// assistant turn per submission, real envelope or synthesized failure.
    /// The guard drops last on every path so a failed call can never wedge
    /// the session.
    pub fn resolve(&mut self, outcome: Result<ResponseEnvelope>) {
        let envelope = match outcome {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!("backend call failed: {err:#}");
                ResponseEnvelope::unavailable()
            }
        };
        self.log.push(Turn::Assistant(envelope));
        self.pending = false;
    }
}

/// Race one transport call against the request bound. Whichever side
/// finishes first wins and the loser is dropped; dropping a reqwest future
/// also tears down its connection. A timeout becomes an ordinary error, so
/// the caller resolves the session through the failure path exactly once.
pub async fn complete_call<F>(call: F) -> Result<ResponseEnvelope>
where
    F: Future<Output = Result<ResponseEnvelope>>,
{
    match tokio::time::timeout(REQUEST_BOUND, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(anyhow!(
            "no reply from backend within {} ms",
            REQUEST_BOUND.as_millis()
        )),
    }
}
