use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Legacy Solr versions flatten `updateHandler.updateLog` into one key
pub const LEGACY_UPDATE_LOG_KEY: &str = "updateHandlerupdateLog";

/// How a single-field edit is written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Partial update (`{"set": value}`), other fields stay untouched
    /// server-side. Only safe with an update log.
    Atomic,
    /// Fetch, modify and resubmit the whole stored document. Non-stored
    /// fields are lost.
    FullRewrite,
}

impl UpdateStrategy {
    pub fn from_update_log(enabled: bool) -> Self {
        if enabled { Self::Atomic } else { Self::FullRewrite }
    }

    pub fn is_atomic(self) -> bool {
        self == Self::Atomic
    }

    /// Operator-facing warning for strategies that can drop data
    pub fn data_loss_warning(self) -> Option<&'static str> {
        match self {
            Self::Atomic => None,
            Self::FullRewrite => Some(
                "WARNING: the server does not support atomic updates. Saving will \
                 discard the content of all non-stored fields (stored=\"false\")!",
            ),
        }
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atomic => write!(f, "atomic"),
            Self::FullRewrite => write!(f, "full-document"),
        }
    }
}

/// Whether a `GET {core}/config` response declares an update log.
///
/// Checks the nested `config.updateHandler.updateLog` shape and the
/// legacy flattened key; either one counts.
pub fn update_log_enabled(config_response: &Value) -> bool {
    let Some(config) = config_response.get("config") else {
        return false;
    };

    let nested = config
        .get("updateHandler")
        .and_then(Value::as_object)
        .is_some_and(|handler| handler.contains_key("updateLog"));
    let flat = config
        .as_object()
        .is_some_and(|c| c.contains_key(LEGACY_UPDATE_LOG_KEY));

    nested || flat
}

const STATUS_UNKNOWN: u8 = 0;
const STATUS_DISABLED: u8 = 1;
const STATUS_ENABLED: u8 = 2;

/// Per-connection memo of the update-log probe.
///
/// Lock-free: two first readers racing on a fresh connection may both probe
/// and both store. The stored value is the same either way, so the last
/// write winning is fine. Never invalidated; a config change on the server
/// is only seen by a new connection.
#[derive(Debug, Default)]
pub struct UpdateLogStatus(AtomicU8);

impl UpdateLogStatus {
    pub fn new() -> Self {
        Self(AtomicU8::new(STATUS_UNKNOWN))
    }

    pub fn get(&self) -> Option<bool> {
        match self.0.load(Ordering::Acquire) {
            STATUS_ENABLED => Some(true),
            STATUS_DISABLED => Some(false),
            _ => None,
        }
    }

    pub fn store(&self, enabled: bool) {
        let status = if enabled { STATUS_ENABLED } else { STATUS_DISABLED };
        self.0.store(status, Ordering::Release);
    }
}
