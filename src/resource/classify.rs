use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Handling strategy for a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Directory: list its contents.
    Browse,
    /// Readable regular file: stream it.
    File,
    /// Executable regular file: run it as a CGI script.
    Cgi,
    /// Anything else: devices, sockets, unreadable files, stat failures.
    Bad,
}

/// Classifies a resolved path from a fresh metadata query.
///
/// Execute permission is checked before read permission, so an executable
/// file is always CGI. Classification never opens the target and is
/// re-done on every request; a handler must still tolerate the target
/// disappearing between classify and open.
pub async fn classify(path: &Path) -> Resource {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(_) => return Resource::Bad,
    };

    if meta.is_dir() {
        return Resource::Browse;
    }

    if meta.is_file() {
        let mode = meta.permissions().mode();
        if mode & 0o111 != 0 {
            return Resource::Cgi;
        }
        if mode & 0o444 != 0 {
            return Resource::File;
        }
    }

    Resource::Bad
}
