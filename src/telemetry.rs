//! Tracing-backend credentials, loaded from a properties file.
//!
//! The observability backend itself is an external collaborator; this
//! module only resolves its credentials once at process start so they can
//! be threaded explicitly through [`crate::config::RunConfig::tracing`]
//! rather than living in ambient global state.
//!
//! The file is INI-style with a `[langfuse]` section and three keys:
//!
//! ```ini
//! [langfuse]
//! langfuse_public_key = pk-lf-...
//! langfuse_secret_key = sk-lf-...
//! langfuse_host = https://cloud.langfuse.com
//! ```
//!
//! Absence of the file, the section, or any key degrades gracefully: the
//! run proceeds without tracing and never fails because tracing is
//! unavailable.

use ini::Ini;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Credentials for the tracing backend. Any field may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TracingCredentials {
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub host: Option<String>,
}

impl TracingCredentials {
    /// All three keys are present, so tracing can actually be enabled.
    pub fn is_complete(&self) -> bool {
        self.public_key.is_some() && self.secret_key.is_some() && self.host.is_some()
    }
}

// Redact the secret key: these values end up in debug logs.
impl fmt::Debug for TracingCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingCredentials")
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .finish()
    }
}

/// Load tracing credentials from a properties file.
///
/// Never fails: any problem (missing file, unparsable content, missing
/// section or keys) is logged as a warning and yields partially or fully
/// empty credentials.
pub fn load_credentials(path: &Path) -> TracingCredentials {
    if !path.exists() {
        warn!("Credentials file not found: {}", path.display());
        return TracingCredentials::default();
    }

    let ini = match Ini::load_from_file(path) {
        Ok(ini) => ini,
        Err(e) => {
            warn!("Failed to parse credentials file {}: {}", path.display(), e);
            return TracingCredentials::default();
        }
    };

    let credentials = match ini.section(Some("langfuse")) {
        Some(section) => TracingCredentials {
            public_key: section.get("langfuse_public_key").map(str::to_string),
            secret_key: section.get("langfuse_secret_key").map(str::to_string),
            host: section.get("langfuse_host").map(str::to_string),
        },
        None => {
            warn!(
                "Credentials file {} has no [langfuse] section",
                path.display()
            );
            TracingCredentials::default()
        }
    };

    info!("Loaded credentials from {}", path.display());
    credentials
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_empty_credentials() {
        let creds = load_credentials(Path::new("/definitely/not/here.properties"));
        assert!(!creds.is_complete());
        assert_eq!(creds, TracingCredentials::default());
    }

    #[test]
    fn full_section_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.properties");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[langfuse]").unwrap();
        writeln!(f, "langfuse_public_key = pk-lf-test").unwrap();
        writeln!(f, "langfuse_secret_key = sk-lf-test").unwrap();
        writeln!(f, "langfuse_host = https://cloud.langfuse.com").unwrap();

        let creds = load_credentials(&path);
        assert!(creds.is_complete());
        assert_eq!(creds.public_key.as_deref(), Some("pk-lf-test"));
        assert_eq!(creds.host.as_deref(), Some("https://cloud.langfuse.com"));
    }

    #[test]
    fn partial_section_is_incomplete_but_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.properties");
        std::fs::write(&path, "[langfuse]\nlangfuse_host = http://localhost:3000\n").unwrap();

        let creds = load_credentials(&path);
        assert!(!creds.is_complete());
        assert_eq!(creds.host.as_deref(), Some("http://localhost:3000"));
        assert!(creds.public_key.is_none());
    }

    #[test]
    fn wrong_section_yields_empty_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.properties");
        std::fs::write(&path, "[other]\nkey = value\n").unwrap();

        let creds = load_credentials(&path);
        assert_eq!(creds, TracingCredentials::default());
    }

    #[test]
    fn debug_redacts_secret_key() {
        let creds = TracingCredentials {
            public_key: Some("pk".into()),
            secret_key: Some("sk-very-secret".into()),
            host: None,
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("redacted"));
    }
}
