use std::path::Path as StdPath;

use axum::{
    extract::{Extension, Multipart, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::user::User,
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

const LOGO_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];
const RESUME_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "txt", "rtf"];

fn validated_extension(filename: &str, allowed: &[&str], data: &[u8]) -> Result<String> {
    let ext = StdPath::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !allowed.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed",
            ext
        )));
    }

    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("File is not a valid PDF".to_string()));
    }
    if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
        return Err(Error::BadRequest("File is not a valid JPEG".to_string()));
    }
    if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Err(Error::BadRequest("File is not a valid PNG".to_string()));
    }

    Ok(ext)
}

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "rtf" => "application/rtf",
        _ => "application/octet-stream",
    }
}

async fn store_upload(
    state: &AppState,
    mut multipart: Multipart,
    prefix: &str,
    owner_id: &str,
    allowed: &[&str],
) -> Result<UploadResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }

        let ext = validated_extension(&filename, allowed, &data)?;
        let key = format!("{}/{}/{}.{}", prefix, owner_id, Uuid::new_v4(), ext);
        let url = state
            .storage_service
            .upload_bytes(&key, data.to_vec(), content_type_for(&ext))
            .await?;
        return Ok(UploadResponse { url });
    }

    Err(Error::BadRequest("Missing file field".to_string()))
}

#[axum::debug_handler]
pub async fn upload_logo(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let response = store_upload(
        &state,
        multipart,
        "logos",
        &user.external_id,
        &LOGO_EXTENSIONS,
    )
    .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let response = store_upload(
        &state,
        multipart,
        "resumes",
        &user.external_id,
        &RESUME_EXTENSIONS,
    )
    .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_must_be_on_the_allowlist() {
        let err = validated_extension("logo.gif", &LOGO_EXTENSIONS, &[0x89, 0x50, 0x4E, 0x47]);
        assert!(err.is_err());
    }

    #[test]
    fn magic_bytes_must_match_the_extension() {
        let err = validated_extension("resume.pdf", &RESUME_EXTENSIONS, b"PK\x03\x04 not a pdf");
        assert!(err.is_err());

        let ok = validated_extension("resume.pdf", &RESUME_EXTENSIONS, b"%PDF-1.7 ...");
        assert_eq!(ok.unwrap(), "pdf");
    }

    #[test]
    fn extension_comparison_is_case_insensitive() {
        let ok = validated_extension("logo.PNG", &LOGO_EXTENSIONS, &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(ok.unwrap(), "png");
    }
}
