//! Core types for instance power actions

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Prefix every compute instance OCID carries
pub const INSTANCE_ID_PREFIX: &str = "ocid1.instance.";

// ============================================================================
// Instance identifier
// ============================================================================

/// Validated compute instance identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidInstanceId("identifier is empty".to_string()));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(Error::InvalidInstanceId(format!(
                "'{}' contains whitespace",
                id
            )));
        }
        // OCIDs use only ASCII alphanumerics, dots, dashes and underscores
        if let Some(bad) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
        {
            return Err(Error::InvalidInstanceId(format!(
                "'{}' contains invalid character '{}'",
                id, bad
            )));
        }
        if !id.starts_with(INSTANCE_ID_PREFIX) || id.len() == INSTANCE_ID_PREFIX.len() {
            return Err(Error::InvalidInstanceId(format!(
                "'{}' does not start with '{}'",
                id, INSTANCE_ID_PREFIX
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InstanceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for InstanceId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

// ============================================================================
// Power actions
// ============================================================================

/// Provider-defined power actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PowerAction {
    Start,
    Stop,
    #[default]
    Reset,
    Softstop,
    Softreset,
    Senddiagnosticinterrupt,
    Diagnosticreboot,
    Rebootmigrate,
}

impl PowerAction {
    pub const ALL: [PowerAction; 8] = [
        PowerAction::Start,
        PowerAction::Stop,
        PowerAction::Reset,
        PowerAction::Softstop,
        PowerAction::Softreset,
        PowerAction::Senddiagnosticinterrupt,
        PowerAction::Diagnosticreboot,
        PowerAction::Rebootmigrate,
    ];

    /// Value of the `action` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Start => "START",
            PowerAction::Stop => "STOP",
            PowerAction::Reset => "RESET",
            PowerAction::Softstop => "SOFTSTOP",
            PowerAction::Softreset => "SOFTRESET",
            PowerAction::Senddiagnosticinterrupt => "SENDDIAGNOSTICINTERRUPT",
            PowerAction::Diagnosticreboot => "DIAGNOSTICREBOOT",
            PowerAction::Rebootmigrate => "REBOOTMIGRATE",
        }
    }

    /// Details sent when the caller supplies none
    pub fn default_details(&self) -> Option<InstancePowerActionDetails> {
        match self {
            PowerAction::Reset => Some(InstancePowerActionDetails::Reset {
                allow_dense_reboot_migration: None,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == upper)
            .ok_or_else(|| {
                Error::InvalidAction(format!(
                    "unknown power action '{}', expected one of: {}",
                    s,
                    Self::ALL.map(|a| a.as_str()).join(", ")
                ))
            })
    }
}

/// Action-specific request body, tagged by `actionType`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "lowercase")]
pub enum InstancePowerActionDetails {
    Reset {
        #[serde(
            rename = "allowDenseRebootMigration",
            skip_serializing_if = "Option::is_none"
        )]
        allow_dense_reboot_migration: Option<bool>,
    },
    Softreset {
        #[serde(
            rename = "allowDenseRebootMigration",
            skip_serializing_if = "Option::is_none"
        )]
        allow_dense_reboot_migration: Option<bool>,
    },
}

impl InstancePowerActionDetails {
    /// Build details for an action, if the action takes any
    pub fn for_action(action: PowerAction, allow_dense_reboot_migration: Option<bool>) -> Option<Self> {
        match action {
            PowerAction::Reset => Some(Self::Reset {
                allow_dense_reboot_migration,
            }),
            PowerAction::Softreset => Some(Self::Softreset {
                allow_dense_reboot_migration,
            }),
            _ => None,
        }
    }

    fn action(&self) -> PowerAction {
        match self {
            Self::Reset { .. } => PowerAction::Reset,
            Self::Softreset { .. } => PowerAction::Softreset,
        }
    }
}

// ============================================================================
// Request / response
// ============================================================================

/// One power action against one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    pub instance_id: InstanceId,
    pub action: PowerAction,
    pub details: Option<InstancePowerActionDetails>,
    /// Sent as `opc-retry-token`
    pub retry_token: Option<String>,
    /// Sent as `if-match`
    pub if_match: Option<String>,
}

impl ActionRequest {
    /// Request with the action's default details
    pub fn new(instance_id: InstanceId, action: PowerAction) -> Self {
        Self {
            instance_id,
            action,
            details: action.default_details(),
            retry_token: None,
            if_match: None,
        }
    }

    pub fn reset(instance_id: InstanceId) -> Self {
        Self::new(instance_id, PowerAction::Reset)
    }

    pub fn with_details(mut self, details: InstancePowerActionDetails) -> Result<Self> {
        if details.action() != self.action {
            return Err(Error::Configuration(format!(
                "details for {} cannot be sent with a {} action",
                details.action(),
                self.action
            )));
        }
        self.details = Some(details);
        Ok(self)
    }

    pub fn with_retry_token(mut self, token: impl Into<String>) -> Self {
        self.retry_token = Some(token.into());
        self
    }

    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    /// JSON body, if the request carries details
    pub fn body(&self) -> Result<Option<Vec<u8>>> {
        match &self.details {
            Some(details) => Ok(Some(serde_json::to_vec(details)?)),
            None => Ok(None),
        }
    }
}

/// Instance payload returned by the provider
///
/// Parsed leniently: the full payload is always kept in [`ActionResponse::raw`],
/// so missing, `null` or oddly typed fields fall back to empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub lifecycle_state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub availability_domain: String,
    #[serde(default, deserialize_with = "nullable")]
    pub compartment_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub shape: String,
    #[serde(default, deserialize_with = "nullable")]
    pub region: String,
    #[serde(default)]
    pub time_created: Option<String>,
}

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Acknowledgment of a submitted action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    pub instance: Instance,
    /// Response body exactly as the provider sent it
    pub raw: serde_json::Value,
    pub request_id: Option<String>,
    pub etag: Option<String>,
}

impl ActionResponse {
    /// Wrap an accepted response body. Never fails: a body that is not an
    /// instance object yields an empty [`Instance`] and is still kept in `raw`.
    pub fn from_body(
        raw: serde_json::Value,
        request_id: Option<String>,
        etag: Option<String>,
    ) -> Self {
        let instance = Instance::deserialize(&raw).unwrap_or_default();
        Self {
            instance,
            raw,
            request_id,
            etag,
        }
    }
}
