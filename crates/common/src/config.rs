//! Provider credential configuration
//!
//! The credential file is the provider's INI-style config:
//!
//! ```text
//! [DEFAULT]
//! user=ocid1.user.oc1..aaaa
//! fingerprint=20:3b:97:13:55:1c:5b:0d:d3:37:d8:50:4e:c5:3a:34
//! key_file=~/.oci/oci_api_key.pem
//! tenancy=ocid1.tenancy.oc1..aaaa
//! region=us-chicago-1
//! ```
//!
//! Values in `[DEFAULT]` are inherited by every other profile.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

/// Name of the fallback profile
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Keys every profile must provide
pub const REQUIRED_KEYS: [&str; 5] = ["user", "fingerprint", "key_file", "tenancy", "region"];

/// Environment variable overriding the config file path
pub const CONFIG_FILE_ENV: &str = "OCI_CONFIG_FILE";

/// Environment variable overriding the profile name
pub const PROFILE_ENV: &str = "OCI_CLI_PROFILE";

/// Default config file path (`~/.oci/config`)
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".oci")
        .join("config")
}

/// Where to read credentials from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub profile: String,
}

impl Default for ConfigLocation {
    fn default() -> Self {
        Self {
            path: default_config_path(),
            profile: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl ConfigLocation {
    pub fn new(path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            profile: profile.into(),
        }
    }

    /// Resolve the location from optional overrides, then the environment, then defaults
    pub fn resolve(path: Option<PathBuf>, profile: Option<String>) -> Self {
        let path = path
            .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from))
            .map(|p| expand_home(&p))
            .unwrap_or_else(default_config_path);
        let profile = profile
            .or_else(|| std::env::var(PROFILE_ENV).ok())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        Self { path, profile }
    }

    /// Load the credentials this location points at
    pub fn load(&self) -> Result<OciConfig> {
        OciConfig::from_file(&self.path, &self.profile)
    }
}

/// Credentials for a single profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OciConfig {
    pub profile: String,
    pub user: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub tenancy: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_phrase: Option<String>,
    /// Keys the invoker does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl OciConfig {
    /// Read and validate a profile from a config file
    pub fn from_file(path: impl AsRef<Path>, profile: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        debug!("Loaded config file {:?}", path);

        // key_file is used as written; a relative path resolves against the working directory
        Self::parse(&content, profile)
    }

    /// Parse config text and select a profile
    pub fn parse(content: &str, profile: &str) -> Result<Self> {
        let sections = parse_ini(content)?;

        let Some(selected) = sections.get(profile) else {
            return Err(Error::Configuration(format!(
                "profile '{}' not found in config file",
                profile
            )));
        };

        let mut values = sections.get(DEFAULT_PROFILE).cloned().unwrap_or_default();
        values.extend(selected.iter().map(|(k, v)| (k.clone(), v.clone())));

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|k| values.get(*k).map_or(true, |v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "profile '{}' is missing required field(s): {}",
                profile,
                missing.join(", ")
            )));
        }

        let mut take = |key: &str| values.remove(key).unwrap_or_default();
        let user = take("user");
        let fingerprint = take("fingerprint");
        let key_file = expand_home(Path::new(&take("key_file")));
        let tenancy = take("tenancy");
        let region = take("region");
        let pass_phrase = values.remove("pass_phrase").filter(|p| !p.is_empty());

        Ok(Self {
            profile: profile.to_string(),
            user,
            fingerprint,
            key_file,
            tenancy,
            region,
            pass_phrase,
            extra: values,
        })
    }

    /// Key id used in request signatures
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }

    /// Copy safe for printing
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.pass_phrase.is_some() {
            copy.pass_phrase = Some("********".to_string());
        }
        copy
    }
}

type Section = BTreeMap<String, String>;

fn parse_ini(content: &str) -> Result<BTreeMap<String, Section>> {
    let mut sections: BTreeMap<String, Section> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest.strip_suffix(']').map(str::trim).filter(|n| !n.is_empty());
            let name = name.ok_or_else(|| {
                Error::Configuration(format!("line {}: malformed section header", idx + 1))
            })?;
            sections.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| {
            Error::Configuration(format!("line {}: expected key=value", idx + 1))
        })?;
        let section = current.as_ref().ok_or_else(|| {
            Error::Configuration(format!("line {}: key outside of any profile", idx + 1))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Configuration(format!("line {}: empty key", idx + 1)));
        }
        sections
            .entry(section.clone())
            .or_default()
            .insert(key.to_string(), value.trim().to_string());
    }

    Ok(sections)
}

/// Expand a leading `~/`
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
# provider credentials
[DEFAULT]
user=ocid1.user.oc1..aaaauser
fingerprint=20:3b:97:13:55:1c:5b:0d:d3:37:d8:50:4e:c5:3a:34
key_file=/keys/oci_api_key.pem
tenancy=ocid1.tenancy.oc1..aaaatenancy
region=us-chicago-1

[ASHBURN]
region = us-ashburn-1
pass_phrase = hunter2
compartment = ocid1.compartment.oc1..aaaa
"#;

    #[test]
    fn test_parse_default_profile() {
        let config = OciConfig::parse(SAMPLE, "DEFAULT").unwrap();
        assert_eq!(config.user, "ocid1.user.oc1..aaaauser");
        assert_eq!(config.region, "us-chicago-1");
        assert_eq!(config.key_file, PathBuf::from("/keys/oci_api_key.pem"));
        assert!(config.pass_phrase.is_none());
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_profile_inherits_default() {
        let config = OciConfig::parse(SAMPLE, "ASHBURN").unwrap();
        assert_eq!(config.region, "us-ashburn-1");
        assert_eq!(config.tenancy, "ocid1.tenancy.oc1..aaaatenancy");
        assert_eq!(config.pass_phrase.as_deref(), Some("hunter2"));
        assert_eq!(
            config.extra.get("compartment").map(String::as_str),
            Some("ocid1.compartment.oc1..aaaa")
        );
    }

    #[test]
    fn test_key_id() {
        let config = OciConfig::parse(SAMPLE, "DEFAULT").unwrap();
        assert_eq!(
            config.key_id(),
            "ocid1.tenancy.oc1..aaaatenancy/ocid1.user.oc1..aaaauser/20:3b:97:13:55:1c:5b:0d:d3:37:d8:50:4e:c5:3a:34"
        );
    }

    #[test]
    fn test_missing_profile() {
        let err = OciConfig::parse(SAMPLE, "FRANKFURT").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("FRANKFURT"));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = OciConfig::parse("[DEFAULT]\nuser=u\nregion=r\n", "DEFAULT").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("fingerprint"));
        assert!(msg.contains("key_file"));
        assert!(msg.contains("tenancy"));
        assert!(!msg.contains("region"));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(OciConfig::parse("[DEFAULT\nuser=u\n", "DEFAULT").is_err());
        assert!(OciConfig::parse("user=u\n", "DEFAULT").is_err());
        assert!(OciConfig::parse("[DEFAULT]\njust some words\n", "DEFAULT").is_err());
    }

    #[test]
    fn test_redacted() {
        let config = OciConfig::parse(SAMPLE, "ASHBURN").unwrap();
        let redacted = config.redacted();
        assert_eq!(redacted.pass_phrase.as_deref(), Some("********"));
        let json = serde_json::to_value(&redacted).unwrap();
        assert_eq!(json["pass_phrase"], "********");
        assert_eq!(json["compartment"], "ocid1.compartment.oc1..aaaa");
    }

    #[test]
    fn test_from_file_keeps_relative_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[DEFAULT]\nuser=u\nfingerprint=f\nkey_file=key.pem\ntenancy=t\nregion=r"
        )
        .unwrap();

        let config = OciConfig::from_file(&path, DEFAULT_PROFILE).unwrap();
        assert_eq!(config.key_file, PathBuf::from("key.pem"));
    }

    #[test]
    fn test_key_file_home_expansion() {
        let config = OciConfig::parse(
            "[DEFAULT]\nuser=u\nfingerprint=f\nkey_file=~/.oci/oci_api_key.pem\ntenancy=t\nregion=r",
            DEFAULT_PROFILE,
        )
        .unwrap();
        match dirs::home_dir() {
            Some(home) => {
                assert_eq!(config.key_file, home.join(".oci").join("oci_api_key.pem"));
                assert!(!config.key_file.starts_with("~"));
            }
            None => assert_eq!(config.key_file, PathBuf::from("~/.oci/oci_api_key.pem")),
        }
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let location = ConfigLocation::new(dir.path().join("nope"), DEFAULT_PROFILE);
        let err = location.load().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_resolve_explicit_overrides() {
        let location = ConfigLocation::resolve(
            Some(PathBuf::from("/etc/oci/config")),
            Some("ASHBURN".to_string()),
        );
        assert_eq!(location.path, PathBuf::from("/etc/oci/config"));
        assert_eq!(location.profile, "ASHBURN");
    }
}
