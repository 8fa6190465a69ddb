use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::{DateTime, SecondsFormat, Utc};
use engine_logging::{engine_debug, engine_warn};
use zibaldone_core::{Metadata, UploadIntent};
use zibaldone_engine::{UploadBody, UploadFile};

const OCTET_STREAM: &str = "application/octet-stream";

/// Describe a file the way a browser would before handing it to the uploader:
/// `size`, `type`, `lastModified` (epoch millis) and `lastModifiedDate`.
///
/// Unreadable paths still produce an intent; the read failure is reported
/// per file when the batch runs.
pub fn intent_for(path: &Path) -> UploadIntent {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut metadata = Metadata::new();
    match fs::metadata(path) {
        Ok(meta) => {
            metadata = metadata.with("size", meta.len());
            metadata = metadata.with("type", mime_for_path(path));
            if let Ok(modified) = meta.modified() {
                let modified: DateTime<Utc> = modified.into();
                let millis = modified
                    .signed_duration_since(DateTime::<Utc>::from(UNIX_EPOCH))
                    .num_milliseconds();
                metadata = metadata
                    .with("lastModified", millis)
                    .with(
                        "lastModifiedDate",
                        modified.to_rfc3339_opts(SecondsFormat::Millis, true),
                    );
            }
        }
        Err(err) => {
            engine_warn!("Cannot stat {:?}: {}", path, err);
            metadata = metadata.with("type", mime_for_path(path));
        }
    }
    engine_debug!("Prepared {} with {} metadata field(s)", filename, metadata.len());

    UploadIntent {
        filename,
        path: path.to_path_buf(),
        metadata,
    }
}

pub fn upload_file(intent: UploadIntent) -> UploadFile {
    let content_type = intent
        .metadata
        .mime_type()
        .unwrap_or(OCTET_STREAM)
        .to_string();
    UploadFile {
        filename: intent.filename,
        content_type,
        body: UploadBody::File(intent.path),
        metadata: serde_json::Value::Object(intent.metadata.as_map().clone()),
    }
}

/// Guess a MIME type from the file extension; unknown extensions map to an
/// empty type, as browsers do.
pub fn mime_for_path(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return "";
    };
    match extension.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "epub" => "application/epub+zip",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "rtf" => "application/rtf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn extensions_map_case_insensitively() {
        assert_eq!(mime_for_path(Path::new("notes/Report.PDF")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("archive.unknown")), "");
        assert_eq!(mime_for_path(Path::new("Makefile")), "");
    }

    #[test]
    fn intent_carries_browser_style_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("essay.md");
        fs::write(&path, "# Title\n").unwrap();

        let intent = intent_for(&path);

        assert_eq!(intent.filename, "essay.md");
        assert_eq!(intent.metadata.size(), Some(8));
        assert_eq!(intent.metadata.mime_type(), Some("text/markdown"));
        assert!(intent.metadata.get("lastModified").unwrap().is_i64());
        let date = intent.metadata.get("lastModifiedDate").unwrap().as_str().unwrap();
        assert!(date.ends_with('Z'));
    }

    #[test]
    fn missing_files_still_become_intents() {
        let intent = intent_for(Path::new("/no/such/dir/scan.png"));
        assert_eq!(intent.filename, "scan.png");
        assert_eq!(intent.metadata.size(), None);

        let file = upload_file(intent);
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.body, UploadBody::File("/no/such/dir/scan.png".into()));
    }

    #[test]
    fn untyped_files_are_sent_as_octet_stream() {
        let intent = UploadIntent {
            filename: "blob".to_string(),
            path: "blob".into(),
            metadata: Metadata::new().with("type", ""),
        };
        assert_eq!(upload_file(intent).content_type, OCTET_STREAM);
    }
}
