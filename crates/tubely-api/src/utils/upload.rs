//! Common utilities for file upload handlers

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tubely_core::AppError;

const UPLOAD_DIR_PREFIX: &str = "tubely-upload-";

/// A multipart file streamed to a private scratch directory.
///
/// The directory and everything in it is removed when this value is dropped,
/// including when the request future is cancelled.
#[derive(Debug)]
pub struct ReceivedFile {
    _dir: TempDir,
    path: PathBuf,
    pub content_type: String,
    pub size: usize,
}

impl ReceivedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A small multipart file buffered in memory
#[derive(Debug)]
pub struct ReceivedBytes {
    pub data: Bytes,
    pub content_type: String,
}

/// Upload limits and allow-list for one multipart field
pub struct FieldRules<'a> {
    pub name: &'a str,
    pub allowed_content_types: &'a [String],
    pub max_bytes: usize,
}

fn map_multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Exact match against the allow-list; parameters such as `; charset=` are not stripped.
pub fn validate_content_type(
    content_type: Option<&str>,
    allowed_types: &[String],
) -> Result<String, AppError> {
    match content_type {
        Some(ct) if allowed_types.iter().any(|allowed| allowed == ct) => Ok(ct.to_string()),
        other => Err(AppError::UnsupportedMediaType {
            content_type: other.unwrap_or("none").to_string(),
            allowed: allowed_types.to_vec(),
        }),
    }
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File size exceeds maximum allowed size of {} MB",
        max_bytes / 1024 / 1024
    ))
}

async fn next_chunk(field: &mut Field<'_>) -> Result<Option<Bytes>, AppError> {
    field.chunk().await.map_err(map_multipart_error)
}

/// Stream the field named `rules.name` to `<scratch dir>/<file_name>`.
///
/// The content type is checked before anything touches the filesystem.
/// Other fields are skipped.
pub async fn receive_file_field(
    mut multipart: Multipart,
    rules: &FieldRules<'_>,
    temp_root: Option<&Path>,
    file_name: &str,
) -> Result<ReceivedFile, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some(rules.name) {
            continue;
        }

        let content_type = validate_content_type(field.content_type(), rules.allowed_content_types)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(UPLOAD_DIR_PREFIX);
        let dir = match temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }?;
        let path = dir.path().join(file_name);

        let mut file = tokio::fs::File::create(&path).await?;
        let mut size = 0usize;
        while let Some(chunk) = next_chunk(&mut field).await? {
            size += chunk.len();
            if size > rules.max_bytes {
                return Err(too_large(rules.max_bytes));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if size == 0 {
            return Err(AppError::InvalidInput(format!(
                "Field '{}' contained an empty file",
                rules.name
            )));
        }

        tracing::debug!(
            field = rules.name,
            content_type = %content_type,
            size = size,
            path = %path.display(),
            "Received upload into scratch directory"
        );

        return Ok(ReceivedFile {
            _dir: dir,
            path,
            content_type,
            size,
        });
    }

    Err(missing_field(rules.name))
}

/// Buffer the field named `rules.name` in memory.
pub async fn read_file_field(
    mut multipart: Multipart,
    rules: &FieldRules<'_>,
) -> Result<ReceivedBytes, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some(rules.name) {
            continue;
        }

        let content_type = validate_content_type(field.content_type(), rules.allowed_content_types)?;

        let mut buf = BytesMut::new();
        while let Some(chunk) = next_chunk(&mut field).await? {
            if buf.len() + chunk.len() > rules.max_bytes {
                return Err(too_large(rules.max_bytes));
            }
            buf.extend_from_slice(&chunk);
        }

        if buf.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Field '{}' contained an empty file",
                rules.name
            )));
        }

        return Ok(ReceivedBytes {
            data: buf.freeze(),
            content_type,
        });
    }

    Err(missing_field(rules.name))
}

fn missing_field(name: &str) -> AppError {
    AppError::InvalidInput(format!("No file provided in field '{}'", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["image/jpeg".to_string(), "image/png".to_string()]
    }

    #[test]
    fn accepts_exact_content_type() {
        assert_eq!(
            validate_content_type(Some("image/png"), &allowed()).unwrap(),
            "image/png"
        );
    }

    #[test]
    fn rejects_parameters_and_case_variants() {
        for ct in ["image/png; charset=utf-8", "IMAGE/PNG", "image/*", "image/gif"] {
            let err = validate_content_type(Some(ct), &allowed()).unwrap_err();
            assert!(
                matches!(err, AppError::UnsupportedMediaType { ref content_type, .. } if content_type == ct)
            );
        }
    }

    #[test]
    fn rejects_missing_content_type() {
        assert!(matches!(
            validate_content_type(None, &allowed()),
            Err(AppError::UnsupportedMediaType { .. })
        ));
    }
}
