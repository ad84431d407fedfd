//! File attachments encoded as data URLs.
//!
//! An [`Attachment`] carries its payload as a self-describing
//! `data:<mime>;base64,<payload>` string. The same string is used to preview
//! the attachment and, with the prefix stripped, as the inline payload sent to
//! the API.

use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observability::{ATTACHMENTS_CAPTURED, ATTACHMENTS_REJECTED};

/// Largest file accepted as an attachment, in bytes.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// The accept hint offered to the file picker.
pub const ACCEPTED_MIME_TYPES: &str = "image/*,text/*,application/pdf";

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An encoded file attachment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    name: String,
    mime_type: String,
    data: String,
}

impl Attachment {
    /// Encodes `bytes` as an attachment.
    ///
    /// Fails with [`Error::AttachmentTooLarge`] when `bytes` is larger than
    /// [`MAX_ATTACHMENT_BYTES`].
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: &[u8],
    ) -> Result<Self> {
        let name = name.into();
        let size = bytes.len() as u64;
        if size > MAX_ATTACHMENT_BYTES {
            return Err(Error::attachment_too_large(name, size, MAX_ATTACHMENT_BYTES));
        }
        let mut mime_type = mime_type.into();
        if mime_type.is_empty() {
            mime_type = DEFAULT_MIME_TYPE.to_string();
        }
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        let data = format!("data:{mime_type};base64,{payload}");
        Ok(Self {
            name,
            mime_type,
            data,
        })
    }

    /// Reads and encodes the file at `path`.
    ///
    /// The size is checked from metadata before the file is read, so an
    /// oversized file is never loaded into memory. The MIME type is derived
    /// from the file extension.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| Error::io(format!("failed to stat {}", path.display()), err))?;
        if metadata.len() > MAX_ATTACHMENT_BYTES {
            return Err(Error::attachment_too_large(
                name,
                metadata.len(),
                MAX_ATTACHMENT_BYTES,
            ));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        Self::from_bytes(name, mime_type_for_path(path), &bytes)
    }

    /// The original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The MIME type embedded in the data URL.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The full data URL.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// The raw base64 payload with the data URL prefix stripped.
    pub fn payload(&self) -> &str {
        match self.data.split_once("base64,") {
            Some((_, payload)) => payload,
            None => &self.data,
        }
    }

    /// Returns true for `image/*` attachments.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Guesses a MIME type from the extension of `path`.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") | Some("log") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("xml") => "text/xml",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// Returns true if `mime_type` matches [`ACCEPTED_MIME_TYPES`].
///
/// The hint is advisory; callers may still attach other types.
pub fn is_accepted_mime_type(mime_type: &str) -> bool {
    ACCEPTED_MIME_TYPES.split(',').any(|pattern| {
        match pattern.strip_suffix("/*") {
            Some(prefix) => mime_type
                .split_once('/')
                .is_some_and(|(kind, _)| kind == prefix),
            None => mime_type == pattern,
        }
    })
}

/// The result of capturing a batch of files.
#[derive(Debug, Default)]
pub struct Capture {
    /// Successfully encoded attachments, in input order.
    pub attachments: Vec<Attachment>,
    /// User-visible warnings, one per oversized file.
    pub warnings: Vec<String>,
}

/// Encodes every file in `paths`.
///
/// Oversized files produce a warning and are skipped. Unreadable files are
/// logged and silently skipped. Neither stops the rest of the batch.
pub async fn capture_attachments<I, P>(paths: I) -> Capture
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut capture = Capture::default();
    for path in paths {
        let path = path.as_ref();
        match Attachment::from_path(path).await {
            Ok(attachment) => {
                ATTACHMENTS_CAPTURED.click();
                capture.attachments.push(attachment);
            }
            Err(Error::AttachmentTooLarge { name, size, .. }) => {
                ATTACHMENTS_REJECTED.click();
                tracing::warn!(file = %name, size, "attachment exceeds size limit");
                capture
                    .warnings
                    .push(format!("File {name} is too large. Max 5MB."));
            }
            Err(err) => {
                ATTACHMENTS_REJECTED.click();
                tracing::error!(path = %path.display(), error = %err, "error reading file");
            }
        }
    }
    capture
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_bytes_builds_data_url() {
        let attachment = Attachment::from_bytes("hello.txt", "text/plain", b"Hello World").unwrap();
        assert_eq!(attachment.name(), "hello.txt");
        assert_eq!(attachment.mime_type(), "text/plain");
        assert_eq!(attachment.data(), "data:text/plain;base64,SGVsbG8gV29ybGQ=");
        assert_eq!(attachment.payload(), "SGVsbG8gV29ybGQ=");
        assert!(!attachment.is_image());
    }

    #[test]
    fn empty_mime_type_falls_back() {
        let attachment = Attachment::from_bytes("blob", "", b"x").unwrap();
        assert_eq!(attachment.mime_type(), "application/octet-stream");
        assert!(attachment.data().starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let at_limit = vec![0u8; MAX_ATTACHMENT_BYTES as usize];
        assert!(Attachment::from_bytes("exact.bin", "image/png", &at_limit).is_ok());

        let over_limit = vec![0u8; MAX_ATTACHMENT_BYTES as usize + 1];
        let err = Attachment::from_bytes("big.png", "image/png", &over_limit).unwrap_err();
        assert!(err.is_attachment_too_large());
    }

    #[test]
    fn mime_types_from_extension() {
        assert_eq!(mime_type_for_path(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("report.pdf")), "application/pdf");
        assert_eq!(mime_type_for_path(Path::new("notes.md")), "text/markdown");
        assert_eq!(
            mime_type_for_path(Path::new("archive.tar.gz")),
            "application/octet-stream"
        );
        assert_eq!(mime_type_for_path(Path::new("Makefile")), "application/octet-stream");
    }

    #[test]
    fn accept_hint() {
        assert!(is_accepted_mime_type("image/png"));
        assert!(is_accepted_mime_type("text/csv"));
        assert!(is_accepted_mime_type("application/pdf"));
        assert!(!is_accepted_mime_type("application/zip"));
        assert!(!is_accepted_mime_type("imagery"));
    }

    #[tokio::test]
    async fn from_path_reads_name_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let attachment = Attachment::from_path(&path).await.unwrap();
        assert_eq!(attachment.name(), "diagram.png");
        assert_eq!(attachment.mime_type(), "image/png");
        assert!(attachment.is_image());
        assert_eq!(attachment.data(), "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn capture_skips_oversized_and_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.txt");
        std::fs::write(&small, b"small").unwrap();

        let exact = dir.path().join("exact.pdf");
        std::fs::write(&exact, vec![b'a'; MAX_ATTACHMENT_BYTES as usize]).unwrap();

        let big = dir.path().join("big.png");
        let mut file = std::fs::File::create(&big).unwrap();
        file.write_all(&vec![0u8; MAX_ATTACHMENT_BYTES as usize + 1])
            .unwrap();
        drop(file);

        let missing = dir.path().join("missing.txt");

        let capture = capture_attachments([&small, &big, &missing, &exact]).await;
        let names: Vec<&str> = capture.attachments.iter().map(Attachment::name).collect();
        assert_eq!(names, vec!["small.txt", "exact.pdf"]);
        assert_eq!(capture.attachments[0].mime_type(), "text/plain");
        assert_eq!(capture.attachments[1].mime_type(), "application/pdf");
        assert_eq!(
            capture.warnings,
            vec!["File big.png is too large. Max 5MB.".to_string()]
        );
    }
}
