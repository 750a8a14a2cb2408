use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unable to resolve path: {0}")]
    NotFound(#[from] std::io::Error),
    #[error("path escapes the document root")]
    Outside,
}

/// Confines request URIs to a canonical document root.
///
/// The root is canonicalized once at construction; every resolved path is
/// re-canonicalized against the live filesystem, so `.`, `..`, and
/// symlinks are all flattened before the containment check.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
}

impl PathSandbox {
    pub fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = std::fs::canonicalize(root.as_ref())
            .with_context(|| format!("unable to canonicalize root {}", root.as_ref().display()))?;
        Ok(Self { root })
    }

    /// The canonical document root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a request URI to a canonical path inside the root.
    ///
    /// Containment is checked component-wise, not as a byte prefix, so a
    /// sibling like `/srv/www-secret` never passes for root `/srv/www`.
    /// The returned path is the only thing handlers may open.
    pub async fn resolve(&self, uri: &str) -> Result<PathBuf, ResolveError> {
        let joined = self.root.join(uri.trim_start_matches('/'));
        let real = tokio::fs::canonicalize(&joined).await?;

        if real.starts_with(&self.root) {
            Ok(real)
        } else {
            Err(ResolveError::Outside)
        }
    }
}
