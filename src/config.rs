use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Server-wide settings, constructed once at startup and passed by
/// reference into the request pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the listener binds to, e.g. "0.0.0.0:9898".
    #[serde(default = "defaults::listen_addr")]
    pub listen_addr: String,

    /// Document root. Every served path must canonicalize inside it.
    #[serde(default = "defaults::root")]
    pub root: PathBuf,

    /// Path to a mime.types-style table file.
    #[serde(default = "defaults::mime_types_path")]
    pub mime_types_path: PathBuf,

    /// Content type served when the table has no match for an extension.
    #[serde(default = "defaults::default_mime_type")]
    pub default_mime_type: String,

    /// How accepted connections are scheduled.
    #[serde(default)]
    pub concurrency: Concurrency,
}

/// Connection scheduling discipline.
///
/// `Spawned` runs one task per accepted connection; `Serial` processes one
/// connection fully before accepting the next. The request pipeline itself
/// is indifferent to the choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concurrency {
    Serial,
    #[default]
    Spawned,
}

mod defaults {
    use std::path::PathBuf;

    pub fn listen_addr() -> String {
        "0.0.0.0:9898".to_string()
    }

    pub fn root() -> PathBuf {
        PathBuf::from("www")
    }

    pub fn mime_types_path() -> PathBuf {
        PathBuf::from("/etc/mime.types")
    }

    pub fn default_mime_type() -> String {
        "text/plain".to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: defaults::listen_addr(),
            root: defaults::root(),
            mime_types_path: defaults::mime_types_path(),
            default_mime_type: defaults::default_mime_type(),
            concurrency: Concurrency::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the YAML file named by `WEAVER_CONFIG`,
    /// falling back to defaults, then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("WEAVER_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("unable to read config file {path}"))?;
                Self::from_yaml(&text)
                    .with_context(|| format!("unable to parse config file {path}"))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("WEAVER_LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("WEAVER_ROOT") {
            cfg.root = PathBuf::from(root);
        }

        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Port component of the listen address, exported to CGI children as
    /// SERVER_PORT.
    pub fn server_port(&self) -> &str {
        self.listen_addr
            .rsplit(':')
            .next()
            .unwrap_or(&self.listen_addr)
    }
}
