//! Result payload types for terminal task statuses.
//!
//! A succeeded operation reports an overall boolean outcome plus one
//! entry per content type. On the wire each entry is
//! `{"status": bool, "details": …}`; when a type fails, `details` is an
//! object carrying a `message`. [`UnitReport`] validates that shape at
//! the serde boundary so the rest of the crate never reaches into
//! untyped mappings.

use std::collections::HashMap;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// Outcome of an operation for a single content type.
///
/// # Examples
///
/// ```
/// use pulp_tasks::UnitReport;
/// use serde_json::json;
///
/// let ok: UnitReport = serde_json::from_value(
///     json!({"status": true, "details": "installed"}),
/// ).unwrap();
/// assert!(ok.succeeded());
///
/// let failed: UnitReport = serde_json::from_value(
///     json!({"status": false, "details": {"message": "boom"}}),
/// ).unwrap();
/// assert_eq!(failed, UnitReport::Failed { message: "boom".to_string() });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum UnitReport {
    /// The operation succeeded for this type; `details` is a
    /// type-specific payload.
    Succeeded {
        /// Type-specific success detail payload.
        details: Value,
    },

    /// The operation failed for this type.
    Failed {
        /// Human-readable error message for this type.
        message: String,
    },
}

impl UnitReport {
    /// Returns `true` for the success variant.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

// Wire shape shared by both variants.
#[derive(Serialize, Deserialize)]
struct RawUnitReport {
    status: bool,
    details: Value,
}

impl Serialize for UnitReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            Self::Succeeded { details } => RawUnitReport {
                status: true,
                details: details.clone(),
            },
            Self::Failed { message } => RawUnitReport {
                status: false,
                details: json!({ "message": message }),
            },
        };
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UnitReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawUnitReport::deserialize(deserializer)?;
        if raw.status {
            Ok(Self::Succeeded {
                details: raw.details,
            })
        } else {
            let message = raw
                .details
                .get("message")
                .and_then(Value::as_str)
                .ok_or_else(|| D::Error::custom("failure report is missing a message"))?
                .to_string();
            Ok(Self::Failed { message })
        }
    }
}

/// The result payload of a succeeded operation.
///
/// `succeeded` is the server-reported overall outcome; `details` maps
/// each content type ID to its per-type report. The overall flag is
/// `false` when any type failed, even though the task itself reached
/// the `Succeeded` state (the operation ran to completion; some units
/// were not applied).
///
/// # Examples
///
/// ```
/// use pulp_tasks::OperationResult;
/// use serde_json::json;
///
/// let result: OperationResult = serde_json::from_value(json!({
///     "status": true,
///     "details": {"rpm": {"status": true, "details": "ok"}},
/// })).unwrap();
/// assert!(result.succeeded);
/// assert!(result.details["rpm"].succeeded());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Overall outcome reported by the server.
    #[serde(rename = "status")]
    pub succeeded: bool,

    /// Per-type reports, keyed by content type ID.
    pub details: HashMap<String, UnitReport>,
}

impl OperationResult {
    /// An all-clear result with no per-type detail.
    pub fn empty_success() -> Self {
        Self {
            succeeded: true,
            details: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_entry_round_trips() {
        let report = UnitReport::Succeeded {
            details: json!({"installed": ["zsh-5.8"]}),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], true);
        assert_eq!(json["details"]["installed"][0], "zsh-5.8");

        let back: UnitReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn failure_entry_nests_message() {
        let report = UnitReport::Failed {
            message: "no such package".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["details"]["message"], "no such package");

        let back: UnitReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn failure_without_message_is_rejected() {
        let err = serde_json::from_value::<UnitReport>(json!({
            "status": false,
            "details": {},
        }))
        .unwrap_err();
        assert!(err.to_string().contains("missing a message"));
    }

    #[test]
    fn result_wire_field_is_status() {
        let result = OperationResult {
            succeeded: false,
            details: HashMap::from([(
                "rpm".to_string(),
                UnitReport::Failed {
                    message: "boom".to_string(),
                },
            )]),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["details"]["rpm"]["details"]["message"], "boom");
    }
}
