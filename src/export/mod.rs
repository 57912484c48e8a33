//! Export wire format: resolved candidates across a process boundary.
//!
//! ```json
//! {"meta": {"messages": [], "usage": ""}, "values": [{"value": "", "display": "", "description": "", "style": "", "noSpace": false}]}
//! ```

mod invocation;

pub use invocation::{Invocation, InvocationError, HIDDEN_SUBCOMMAND, SANDBOX_ENV};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{InvokedAction, Meta, RawValue};

/// Payload shared with the empty-result fallback.
const EMPTY_PAYLOAD: &str = r#"{"meta":{},"values":[]}"#;

/// Errors importing a payload.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed completion payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Candidate ordering applied before export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Normal completion output.
    Display,
    /// Sandbox comparisons.
    Value,
}

/// Serialized form of a resolved action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub values: Vec<RawValue>,
}

impl Export {
    /// Prefix-filter against `current`, then sort by `order`.
    pub fn new(invoked: InvokedAction, current: &str, order: Order) -> Self {
        let filtered = invoked.filter_prefix(current);
        let sorted = match order {
            Order::Display => filtered.sort_by_display(),
            Order::Value => filtered.sort_by_value(),
        };
        Self {
            meta: sorted.meta,
            values: sorted.values,
        }
    }

    pub fn parse(output: &[u8]) -> Result<Self, ImportError> {
        Ok(serde_json::from_slice(output)?)
    }

    /// Compact JSON. Encoding failures yield an empty payload so the shell
    /// still receives something parseable.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to encode completion payload");
            EMPTY_PAYLOAD.to_string()
        })
    }

    /// Indented JSON, as compared by the sandbox.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to encode completion payload");
            EMPTY_PAYLOAD.to_string()
        })
    }
}

impl From<Export> for InvokedAction {
    fn from(export: Export) -> Self {
        InvokedAction {
            meta: export.meta,
            values: export.values,
        }
    }
}
