use std::path::Path;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::handler::write_head;
use crate::http::connection::Connection;
use crate::http::request::Request;
use crate::http::status::HttpStatus;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Lists the contents of a directory in HTML.
///
/// Entries are sorted by name; the literal `.` entry is excluded while
/// `..` and dotfiles are kept. Image entries get an inline thumbnail
/// before their link.
pub async fn handle<S>(
    req: &Request,
    path: &Path,
    conn: &mut Connection<S>,
) -> Result<(), HttpStatus>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let entries = read_entries(path).await.map_err(|e| {
        debug!("unable to enumerate {}: {}", path.display(), e);
        HttpStatus::InternalServerError
    })?;

    let body = render_listing(&req.uri, &entries);

    let write = async {
        write_head(conn, HttpStatus::Ok, "text/html").await?;
        conn.write_all(body.as_bytes()).await?;
        conn.flush().await
    };
    write.await.map_err(|e| {
        debug!("browse write failed: {e}");
        HttpStatus::InternalServerError
    })
}

async fn read_entries(path: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = vec!["..".to_string()];

    let mut dir = tokio::fs::read_dir(path).await?;
    while let Some(entry) = dir.next_entry().await? {
        entries.push(entry.file_name().to_string_lossy().into_owned());
    }
    entries.sort();

    Ok(entries)
}

fn render_listing(uri: &str, entries: &[String]) -> String {
    let mut body = String::from("<html>\r\n<body>\r\n<ul>\r\n");

    for name in entries {
        // A root URI contributes nothing so links don't start with "//".
        let base = if uri == "/" { "" } else { uri };
        let href = format!("{base}/{name}");

        if is_image(name) {
            body.push_str(&format!(
                "\t<img src=\"{href}\" width=\"50\" height=\"50\"/><li><a href=\"{href}\">{name}</a></li>\r\n"
            ));
        } else {
            body.push_str(&format!("\t<li><a href=\"{href}\">{name}</a></li>\r\n"));
        }
    }

    body.push_str("</ul>\r\n</body>\r\n</html>\r\n");
    body
}

fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|image| ext.eq_ignore_ascii_case(image))
        })
}
