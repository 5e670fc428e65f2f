//! Server response classification
//!
//! Job servers answer both endpoints with loosely shaped JSON objects.
//! The constructors here turn a parsed body into a [`ServerResponse`],
//! following the same truthiness rules the servers' browser clients use.

use serde_json::Value;

/// `status` value of an accepted submission
pub const STATUS_CREATED: &str = "created";
/// `status` value of a job still in progress
pub const STATUS_RUNNING: &str = "running";
/// `status` value of a finished job
pub const STATUS_SUCCESS: &str = "success";

/// A classified response from the execute or poll endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerResponse {
    /// Submission accepted; `location` is the job handle to poll
    Created { location: String },
    /// Job still in progress
    Running,
    /// Job finished; `keys` identify the results, in server order
    Success { keys: Vec<String> },
    /// Job failed; the server may omit the message
    Error { message: Option<String> },
    /// Body was not valid JSON
    Malformed,
    /// Poll body with neither a truthy `error` nor a known `status`
    Unrecognized,
}

impl ServerResponse {
    /// Classifies the body returned by the execute endpoint
    ///
    /// Anything other than `status: "created"` with a string `location` is a
    /// submission error carrying whatever `error` content was present.
    pub fn from_creation(obj: &Value) -> Self {
        if obj.get("status").and_then(Value::as_str) == Some(STATUS_CREATED) {
            if let Some(location) = obj.get("location").and_then(Value::as_str) {
                return ServerResponse::Created {
                    location: location.to_string(),
                };
            }
        }

        ServerResponse::Error {
            message: error_message(obj),
        }
    }

    /// Classifies the body returned by a job handle
    ///
    /// A truthy `error` wins over any `status` in the same body.
    pub fn from_poll(obj: &Value) -> Self {
        if obj.get("error").is_some_and(is_truthy) {
            return ServerResponse::Error {
                message: error_message(obj),
            };
        }

        match obj.get("status").and_then(Value::as_str) {
            Some(STATUS_RUNNING) => ServerResponse::Running,
            Some(STATUS_SUCCESS) => ServerResponse::Success {
                keys: result_keys(obj),
            },
            _ => ServerResponse::Unrecognized,
        }
    }
}

/// Extracts the `error` field verbatim
///
/// Strings are taken as-is, other JSON values in their text form; an absent
/// or null field yields `None`.
fn error_message(obj: &Value) -> Option<String> {
    match obj.get("error") {
        None | Some(Value::Null) => None,
        Some(Value::String(message)) => Some(message.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn result_keys(obj: &Value) -> Vec<String> {
    obj.get("keys")
        .and_then(Value::as_array)
        .map(|keys| {
            keys.iter()
                .map(|key| match key {
                    Value::String(key) => key.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_creation_with_location() {
        let response =
            ServerResponse::from_creation(&json!({"status": "created", "location": "/poll/1"}));
        assert_eq!(
            response,
            ServerResponse::Created {
                location: "/poll/1".to_string()
            }
        );
    }

    #[test]
    fn test_creation_error_keeps_message() {
        let response = ServerResponse::from_creation(&json!({"error": "some error"}));
        assert_eq!(
            response,
            ServerResponse::Error {
                message: Some("some error".to_string())
            }
        );
    }

    #[test]
    fn test_creation_without_error_field_has_no_message() {
        let response = ServerResponse::from_creation(&json!({"status": "queued"}));
        assert_eq!(response, ServerResponse::Error { message: None });
    }

    #[test]
    fn test_creation_without_location_is_an_error() {
        let response = ServerResponse::from_creation(&json!({"status": "created"}));
        assert_eq!(response, ServerResponse::Error { message: None });
    }

    #[test]
    fn test_poll_running_and_success() {
        assert_eq!(
            ServerResponse::from_poll(&json!({"status": "running"})),
            ServerResponse::Running
        );
        assert_eq!(
            ServerResponse::from_poll(&json!({"status": "success", "keys": ["key1", "key2"]})),
            ServerResponse::Success {
                keys: vec!["key1".to_string(), "key2".to_string()]
            }
        );
    }

    #[test]
    fn test_poll_error_wins_over_status() {
        let response = ServerResponse::from_poll(&json!({
            "status": "failure",
            "error": "job execution terminated with an error",
        }));
        assert_eq!(
            response,
            ServerResponse::Error {
                message: Some("job execution terminated with an error".to_string())
            }
        );

        let response = ServerResponse::from_poll(&json!({"status": "running", "error": "boom"}));
        assert!(matches!(response, ServerResponse::Error { .. }));
    }

    #[test]
    fn test_poll_falsy_error_is_ignored() {
        assert_eq!(
            ServerResponse::from_poll(&json!({"status": "running", "error": ""})),
            ServerResponse::Running
        );
        assert_eq!(
            ServerResponse::from_poll(&json!({"status": "running", "error": null})),
            ServerResponse::Running
        );
    }

    #[test]
    fn test_poll_unrecognized() {
        assert_eq!(
            ServerResponse::from_poll(&json!({})),
            ServerResponse::Unrecognized
        );
        assert_eq!(
            ServerResponse::from_poll(&json!({"status": "failure"})),
            ServerResponse::Unrecognized
        );
        assert_eq!(
            ServerResponse::from_poll(&json!(["not", "an", "object"])),
            ServerResponse::Unrecognized
        );
    }

    #[test]
    fn test_success_without_keys() {
        assert_eq!(
            ServerResponse::from_poll(&json!({"status": "success"})),
            ServerResponse::Success { keys: vec![] }
        );
    }

    #[test]
    fn test_non_string_error_and_keys_use_json_text() {
        assert_eq!(
            ServerResponse::from_poll(&json!({"error": {"code": 3}})),
            ServerResponse::Error {
                message: Some(r#"{"code":3}"#.to_string())
            }
        );
        assert_eq!(
            ServerResponse::from_poll(&json!({"status": "success", "keys": ["out", 7]})),
            ServerResponse::Success {
                keys: vec!["out".to_string(), "7".to_string()]
            }
        );
    }
}
