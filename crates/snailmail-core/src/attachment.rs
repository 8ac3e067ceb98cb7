//! Loading attachment files from disk.

use crate::error::{Error, Result};
use snailmail_mime::{Attachment, ContentType};
use std::path::Path;
use tracing::debug;

/// Extensions that mark a compressed file rather than its content type.
const ENCODING_SUFFIXES: &[&str] = &[
    "gz", "bz2", "xz", "br", "tgz", "taz", "tz", "tbz2", "txz", "svgz",
];

/// Loads every file in order.
///
/// Stops at the first unreadable file; no partial set is returned.
///
/// # Errors
///
/// Returns [`Error::FileAccess`] naming the first path that cannot be read.
pub async fn load_attachments<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Attachment>> {
    let mut attachments = Vec::with_capacity(paths.len());
    for path in paths {
        attachments.push(load_attachment(path.as_ref()).await?);
    }
    Ok(attachments)
}

/// Reads one file and infers its content type from the name.
///
/// The recorded filename is the final path component.
///
/// # Errors
///
/// Returns [`Error::FileAccess`] if the file cannot be opened or read.
pub async fn load_attachment(path: &Path) -> Result<Attachment> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| Error::file_access(path, e))?;

    let filename = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let content_type = guess_content_type(&filename);

    debug!(
        file = %path.display(),
        content_type = %content_type,
        bytes = content.len(),
        "attachment loaded"
    );

    Ok(Attachment::new(content, content_type, filename))
}

/// Infers a content type from a filename.
///
/// Falls back to `application/octet-stream` when the extension is unknown
/// or names a compression format.
#[must_use]
pub fn guess_content_type(filename: &str) -> ContentType {
    if has_encoding_suffix(filename) {
        return ContentType::octet_stream();
    }

    mime_guess::from_path(filename)
        .first()
        .map_or_else(ContentType::octet_stream, |mime| {
            ContentType::new(mime.type_().as_str(), mime.subtype().as_str())
        })
}

fn has_encoding_suffix(filename: &str) -> bool {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return false;
    };
    ext == "Z" || ENCODING_SUFFIXES.contains(&ext.to_ascii_lowercase().as_str())
}
