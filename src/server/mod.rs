//! Server runtime
//!
//! Startup wiring and the accept loop. The `Server` value is the immutable
//! per-process context every request borrows: configuration, the path
//! sandbox, and the MIME table.

pub mod listener;

use crate::config::Config;
use crate::resource::mime::MimeTable;
use crate::resource::sandbox::PathSandbox;

pub struct Server {
    pub config: Config,
    pub sandbox: PathSandbox,
    pub mime: MimeTable,
}

impl Server {
    /// Builds the process-wide context: canonicalizes the document root
    /// and loads the MIME table. A root that cannot be canonicalized is
    /// fatal at startup.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let sandbox = PathSandbox::new(&config.root)?;
        let mime = MimeTable::load(&config.mime_types_path, &config.default_mime_type);
        Ok(Self {
            config,
            sandbox,
            mime,
        })
    }
}
