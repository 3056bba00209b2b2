// Site state module
// Resolves the configured asset root once at startup

use std::io;
use std::path::PathBuf;

use super::types::Config;

/// Asset root resolved at startup.
///
/// The root is canonicalized here so per-request resolution can compare
/// canonical paths against it. Assets under the root are read-only for the
/// life of the process; nothing in here changes after construction.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub root: PathBuf,
    pub default_document: String,
}

impl SiteContext {
    /// Validate and canonicalize the configured asset root.
    ///
    /// A missing or unreadable root is a startup error, not a per-request
    /// 404: the server must fail to become ready rather than silently serve
    /// nothing.
    pub fn new(config: &Config) -> io::Result<Self> {
        let root = PathBuf::from(&config.site.root);
        let root = root.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("asset root '{}' is not accessible: {e}", config.site.root),
            )
        })?;

        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("asset root '{}' is not a directory", config.site.root),
            ));
        }

        Ok(Self {
            root,
            default_document: config.site.default_document.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig};

    fn test_config(root: &str) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            site: SiteConfig {
                root: root.to_string(),
                default_document: "index.html".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "dev".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
        }
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        let cfg = test_config(missing.to_str().unwrap());
        assert!(SiteContext::new(&cfg).is_err());
    }

    #[test]
    fn test_existing_root_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path().to_str().unwrap());
        let site = SiteContext::new(&cfg).unwrap();
        assert_eq!(site.root, dir.path().canonicalize().unwrap());
        assert_eq!(site.default_document, "index.html");
    }
}
