//! Decoding of wire-protocol responses.
//!
//! Winium drivers speak the JSON wire protocol (`{sessionId, status, value}`).
//! W3C-shaped bodies (`{value: {...}}` with an `error` field on failure) are
//! accepted too so the executor works against either kind of endpoint.

use serde_json::Value;

use crate::error::RemoteError;

/// Element reference key used by the JSON wire protocol.
pub const JSON_WIRE_ELEMENT_KEY: &str = "ELEMENT";

/// Element reference key used by W3C WebDriver.
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Status code reported for W3C errors, which carry no numeric status.
const UNKNOWN_ERROR_STATUS: i64 = 13;

/// A successfully decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub session_id: Option<String>,
    pub status: i64,
    pub value: Value,
}

impl Response {
    /// Decode a raw HTTP body.
    ///
    /// An empty body with a success status is treated as a `null` value.
    /// A non-2xx reply is always an error: protocol errors in the body win,
    /// otherwise the HTTP status and body text are reported.
    pub fn from_body(http_status: u16, body: &str) -> Result<Self, RemoteError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            if (200..300).contains(&http_status) {
                return Ok(Self {
                    session_id: None,
                    status: 0,
                    value: Value::Null,
                });
            }
            return Err(RemoteError::MalformedResponse(format!(
                "empty body with HTTP status {http_status}"
            )));
        }

        let json: Value = serde_json::from_str(trimmed).map_err(|e| {
            RemoteError::MalformedResponse(format!("HTTP status {http_status}: {e}"))
        })?;
        let response = Self::from_json(json)?;
        if !(200..300).contains(&http_status) {
            let message = match &response.value {
                Value::String(s) => s.clone(),
                _ => trimmed.to_string(),
            };
            return Err(RemoteError::Command {
                status: i64::from(http_status),
                message,
            });
        }
        Ok(response)
    }

    /// Decode an already-parsed JSON body.
    pub fn from_json(body: Value) -> Result<Self, RemoteError> {
        let mut object = match body {
            Value::Object(object) => object,
            other => {
                return Err(RemoteError::MalformedResponse(format!(
                    "expected a JSON object, got {other}"
                )));
            }
        };

        let status = object.get("status").and_then(Value::as_i64).unwrap_or(0);
        let value = object.remove("value").unwrap_or(Value::Null);

        if let Some(error) = value.get("error").and_then(Value::as_str) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(error)
                .to_string();
            return Err(RemoteError::Command {
                status: if status != 0 { status } else { UNKNOWN_ERROR_STATUS },
                message,
            });
        }

        if status != 0 {
            let message = match &value {
                Value::String(s) => s.clone(),
                other => other
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .unwrap_or_else(|| other.to_string()),
            };
            return Err(RemoteError::Command { status, message });
        }

        let session_id = object
            .get("sessionId")
            .and_then(Value::as_str)
            .or_else(|| value.get("sessionId").and_then(Value::as_str))
            .map(str::to_owned);

        Ok(Self {
            session_id,
            status,
            value,
        })
    }
}

/// Extract the element id from a JSON wire or W3C element reference.
pub fn element_id(value: &Value) -> Result<String, RemoteError> {
    value
        .get(JSON_WIRE_ELEMENT_KEY)
        .or_else(|| value.get(W3C_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| RemoteError::MalformedResponse(format!("not an element reference: {value}")))
}
