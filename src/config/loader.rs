//! Service manifest loading from disk.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::schema::DeclaredConfig;

/// A service manifest: which registered module to run, plus declared fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceManifest {
    /// Name of the module in the service registry.
    pub service: Option<String>,

    #[serde(flatten)]
    pub declared: DeclaredConfig,
}

/// Error type for manifest loading.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse manifest: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load a service manifest from a TOML file.
pub fn load_manifest(path: &Path) -> Result<ServiceManifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    let manifest: ServiceManifest = toml::from_str(&content)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PortValue;
    use std::io::Write;

    #[test]
    fn test_load_manifest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service = \"health\"\nPORT = 9100\nHOSTNAME = \"localhost\"").unwrap();

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.service.as_deref(), Some("health"));
        assert_eq!(manifest.declared.port, Some(PortValue::Number(9100)));
        assert_eq!(manifest.declared.hostname.as_deref(), Some("localhost"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_manifest(Path::new("/nonexistent/service.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service = ").unwrap();
        assert!(matches!(
            load_manifest(file.path()).unwrap_err(),
            ManifestError::Parse(_)
        ));
    }
}
