use thiserror::Error;

/// The two failure classes callers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service could not be reached or the connection failed mid-request.
    Transport,
    /// The service answered, but not with a usable success response.
    Server,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error {status}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Server { status: u16, detail: Option<String> },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Longest raw (non-JSON) error body kept as detail.
const MAX_RAW_DETAIL: usize = 200;

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) | Self::InvalidUrl { .. } => FailureKind::Transport,
            Self::Server { .. } | Self::MalformedResponse(_) => FailureKind::Server,
        }
    }

    /// Server-provided explanation, when there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Server { detail, .. } => detail.as_deref(),
            Self::MalformedResponse(reason) => Some(reason),
            _ => None,
        }
    }

    /// Build a server error from a non-success status and its body.
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::Server {
            status,
            detail: extract_detail(body),
        }
    }
}

/// Pull the explanation out of an error body.
///
/// The service answers `{"detail": "..."}` for handled errors and
/// `{"detail": [{"msg": "...", ...}, ...]}` for request validation failures.
fn extract_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        let mut raw: String = body.chars().take(MAX_RAW_DETAIL).collect();
        if raw.len() < body.len() {
            raw.push('…');
        }
        return Some(raw);
    };

    match json.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        Some(other) if !other.is_null() => Some(other.to_string()),
        _ => json
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
    }
}
