use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

/// Extension to content-type lookup backed by a mime.types-style file.
///
/// The table file consists of rules in the form
///
/// ```text
/// <MIMETYPE>  <EXT1> <EXT2> ...
/// ```
///
/// with `#` comment lines. The first rule mentioning an extension wins.
#[derive(Debug, Clone)]
pub struct MimeTable {
    by_ext: HashMap<String, String>,
    default_type: String,
}

impl MimeTable {
    /// Loads the table file. An unreadable file leaves the table empty, so
    /// every lookup falls back to the default type.
    pub fn load(path: &Path, default_type: impl Into<String>) -> Self {
        let mut by_ext = HashMap::new();

        match std::fs::read_to_string(path) {
            Ok(text) => {
                for line in text.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let mut fields = line.split_whitespace();
                    let Some(mimetype) = fields.next() else {
                        continue;
                    };
                    for ext in fields {
                        by_ext
                            .entry(ext.to_string())
                            .or_insert_with(|| mimetype.to_string());
                    }
                }
            }
            Err(e) => {
                warn!("unable to read mime types from {}: {}", path.display(), e);
            }
        }

        Self {
            by_ext,
            default_type: default_type.into(),
        }
    }

    /// Content type for a path's extension, or the default type when the
    /// path has no extension or the table has no match.
    pub fn lookup(&self, path: &Path) -> &str {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_ext.get(ext))
            .map(String::as_str)
            .unwrap_or(&self.default_type)
    }

    pub fn default_type(&self) -> &str {
        &self.default_type
    }
}
