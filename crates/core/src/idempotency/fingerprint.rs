//! Canonical request hashing.
//!
//! Object keys are sorted recursively before encoding, so two requests that
//! differ only in key order hash the same.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A mutating request as seen by the guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotentRequest {
    /// Caller-supplied idempotency key.
    pub key: String,
    /// HTTP method, compared case-insensitively.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Request body.
    pub body: Value,
}

impl IdempotentRequest {
    /// Creates a request. The key is trimmed and the method uppercased.
    pub fn new(
        key: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        body: Value,
    ) -> Self {
        Self {
            key: key.into().trim().to_string(),
            method: method.into().to_uppercase(),
            path: path.into(),
            body,
        }
    }

    /// Content hash of method, path, and canonical body.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.method, &self.path, &self.body)
    }
}

/// Hex SHA-256 of `METHOD\npath\ncanonical-body`.
#[must_use]
pub fn fingerprint(method: &str, path: &str, body: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(path.as_bytes());
    hasher.update(b"\n");
    hasher.update(canonical_json(body).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compact JSON with object keys sorted at every level.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
