//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::{Serialize, Serializer};

use ocipower_common::{ActionResponse, OciConfig};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Render a single item
pub fn render_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(T::headers());
            table.add_row(item.row());
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(item)?,
        OutputFormat::Yaml => serde_yaml::to_string(item)?.trim_end().to_string(),
        OutputFormat::Plain => T::headers()
            .iter()
            .zip(item.row())
            .map(|(header, value)| format!("{}: {}", header, value))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(rendered)
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_item(item, format)?);
    Ok(())
}

/// Print success message
pub fn print_success(message: &str) {
    eprintln!("✅ {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    eprintln!("ℹ️  {}", message);
}

/// Action response as shown to the user
///
/// Structured formats serialize the provider payload untouched.
pub struct ResponseDisplay {
    pub response: ActionResponse,
}

impl From<ActionResponse> for ResponseDisplay {
    fn from(response: ActionResponse) -> Self {
        Self { response }
    }
}

impl Serialize for ResponseDisplay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.response.raw.serialize(serializer)
    }
}

impl TableDisplay for ResponseDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "State", "Shape", "Region", "Request ID"]
    }

    fn row(&self) -> Vec<String> {
        let instance = &self.response.instance;
        vec![
            instance.id.clone(),
            instance.display_name.clone(),
            instance.lifecycle_state.clone(),
            instance.shape.clone(),
            instance.region.clone(),
            self.response.request_id.clone().unwrap_or_default(),
        ]
    }
}

/// Loaded credentials as shown to the user, secrets redacted
#[derive(Serialize)]
#[serde(transparent)]
pub struct ConfigDisplay {
    pub config: OciConfig,
}

impl From<&OciConfig> for ConfigDisplay {
    fn from(config: &OciConfig) -> Self {
        Self {
            config: config.redacted(),
        }
    }
}

impl TableDisplay for ConfigDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Profile", "User", "Tenancy", "Fingerprint", "Key File", "Region"]
    }

    fn row(&self) -> Vec<String> {
        let c = &self.config;
        vec![
            c.profile.clone(),
            c.user.clone(),
            c.tenancy.clone(),
            c.fingerprint.clone(),
            c.key_file.display().to_string(),
            c.region.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> ActionResponse {
        ActionResponse::from_body(
            serde_json::json!({
                "id": "ocid1.instance.oc1..abc",
                "displayName": "mc-server",
                "lifecycleState": "RUNNING",
                "shape": "VM.Standard.A1.Flex",
                "region": "us-chicago-1",
                "freeformTags": {"game": "minecraft"}
            }),
            Some("req-1".to_string()),
            None,
        )
    }

    #[test]
    fn test_json_is_provider_payload() {
        let display = ResponseDisplay::from(response());
        let rendered = render_item(&display, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, display.response.raw);
    }

    #[test]
    fn test_plain_output() {
        let rendered = render_item(&ResponseDisplay::from(response()), OutputFormat::Plain).unwrap();
        assert!(rendered.contains("Name: mc-server"));
        assert!(rendered.contains("State: RUNNING"));
        assert!(rendered.contains("Request ID: req-1"));
    }

    #[test]
    fn test_table_output() {
        let rendered = render_item(&ResponseDisplay::from(response()), OutputFormat::Table).unwrap();
        assert!(rendered.contains("mc-server"));
        assert!(rendered.contains("VM.Standard.A1.Flex"));
    }

    #[test]
    fn test_yaml_output() {
        let rendered = render_item(&ResponseDisplay::from(response()), OutputFormat::Yaml).unwrap();
        assert!(rendered.contains("lifecycleState: RUNNING"));
        assert!(rendered.contains("game: minecraft"));
    }

    #[test]
    fn test_config_display_redacts_pass_phrase() {
        let config = OciConfig::parse(
            "[DEFAULT]\nuser=u\nfingerprint=f\nkey_file=/k.pem\ntenancy=t\nregion=r\npass_phrase=secret\n",
            "DEFAULT",
        )
        .unwrap();
        let rendered = render_item(&ConfigDisplay::from(&config), OutputFormat::Json).unwrap();
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("********"));
    }
}
