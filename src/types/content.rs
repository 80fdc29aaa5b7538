//! Content unit addressing and typed operation requests.
//!
//! Operations against a consumer name an ordered sequence of content
//! units and carry per-operation option records. Options are explicit
//! named fields validated at the boundary, not string-keyed mappings.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named, typed content item, such as a package.
///
/// The `unit_key` identifies the unit within its type. Its shape is
/// type-specific (an RPM is keyed by name, other types may key on
/// several fields), so it remains a JSON mapping; everything around it
/// is typed.
///
/// # Examples
///
/// ```
/// use pulp_tasks::ContentUnit;
///
/// let unit = ContentUnit::by_name("rpm", "zsh");
/// assert_eq!(unit.type_id, "rpm");
/// assert_eq!(unit.unit_key["name"], "zsh");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnit {
    /// Content type identifier, e.g. `"rpm"`.
    pub type_id: String,

    /// Type-specific key identifying the unit.
    pub unit_key: Value,
}

impl ContentUnit {
    /// Creates a unit with an explicit type-specific key.
    pub fn new(type_id: impl Into<String>, unit_key: Value) -> Self {
        Self {
            type_id: type_id.into(),
            unit_key,
        }
    }

    /// Creates a unit keyed by name, the common case for package types.
    pub fn by_name(type_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(type_id, json!({ "name": name.into() }))
    }
}

/// Options recognized by an install operation.
///
/// `apply` controls whether the change is committed on the consumer or
/// only evaluated; `import_keys` permits importing package signing keys;
/// `reboot` requests a reboot once the install completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Commit the change on the consumer. Defaults to `true`.
    pub apply: bool,

    /// Import package signing keys as needed. Defaults to `false`.
    #[serde(rename = "importkeys")]
    pub import_keys: bool,

    /// Reboot the consumer after the operation. Defaults to `false`.
    pub reboot: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            apply: true,
            import_keys: false,
            reboot: false,
        }
    }
}

/// Options recognized by an update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Commit the change on the consumer. Defaults to `true`.
    pub apply: bool,

    /// Import package signing keys as needed. Defaults to `false`.
    #[serde(rename = "importkeys")]
    pub import_keys: bool,

    /// Reboot the consumer after the operation. Defaults to `false`.
    pub reboot: bool,

    /// Update all installed units of the named types, ignoring unit keys.
    /// Defaults to `false`.
    pub all: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            apply: true,
            import_keys: false,
            reboot: false,
            all: false,
        }
    }
}

/// Options recognized by an uninstall operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UninstallOptions {
    /// Commit the change on the consumer. Defaults to `true`.
    pub apply: bool,

    /// Reboot the consumer after the operation. Defaults to `false`.
    pub reboot: bool,
}

impl Default for UninstallOptions {
    fn default() -> Self {
        Self {
            apply: true,
            reboot: false,
        }
    }
}

/// A content operation to run against a consumer.
///
/// Each variant carries the ordered units it applies to and the option
/// record for its operation.
///
/// # Examples
///
/// ```
/// use pulp_tasks::{ContentUnit, InstallOptions, OperationRequest};
///
/// let request = OperationRequest::Install {
///     units: vec![ContentUnit::by_name("rpm", "zsh")],
///     options: InstallOptions::default(),
/// };
/// assert_eq!(request.kind(), "install");
/// assert_eq!(request.units().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    /// Install content units on the consumer.
    Install {
        /// Units to install, in order.
        units: Vec<ContentUnit>,
        /// Install options.
        options: InstallOptions,
    },

    /// Update content units already installed on the consumer.
    Update {
        /// Units to update, in order.
        units: Vec<ContentUnit>,
        /// Update options.
        options: UpdateOptions,
    },

    /// Uninstall content units from the consumer.
    Uninstall {
        /// Units to remove, in order.
        units: Vec<ContentUnit>,
        /// Uninstall options.
        options: UninstallOptions,
    },
}

impl OperationRequest {
    /// The operation name, as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Install { .. } => "install",
            Self::Update { .. } => "update",
            Self::Uninstall { .. } => "uninstall",
        }
    }

    /// The ordered units this operation applies to.
    pub fn units(&self) -> &[ContentUnit] {
        match self {
            Self::Install { units, .. }
            | Self::Update { units, .. }
            | Self::Uninstall { units, .. } => units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_by_name_builds_name_key() {
        let unit = ContentUnit::by_name("rpm", "vim-enhanced");
        assert_eq!(unit.unit_key, json!({"name": "vim-enhanced"}));
    }

    #[test]
    fn install_options_wire_names() {
        let options = InstallOptions {
            import_keys: true,
            ..InstallOptions::default()
        };
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(json["importkeys"], true);
        assert_eq!(json["apply"], true);
        assert_eq!(json["reboot"], false);
    }

    #[test]
    fn request_tagged_serialization() {
        let request = OperationRequest::Uninstall {
            units: vec![ContentUnit::by_name("rpm", "emacs")],
            options: UninstallOptions::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["operation"], "uninstall");
        assert_eq!(json["units"][0]["type_id"], "rpm");

        let back: OperationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn update_all_flag_round_trips() {
        let request = OperationRequest::Update {
            units: vec![],
            options: UpdateOptions {
                all: true,
                ..UpdateOptions::default()
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["options"]["all"], true);
        let back: OperationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
