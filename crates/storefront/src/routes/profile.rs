//! Profile route handlers: contact details, avatar upload, password change.

use std::path::{Path as FsPath, PathBuf};

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use ivylane_core::{Email, Phone};

use crate::db::profiles;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Profile;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// File extensions accepted for avatar uploads.
const ALLOWED_AVATAR_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Avatar payload.
#[derive(Debug, Clone, Serialize)]
pub struct AvatarPayload {
    pub src: String,
    pub alt: String,
}

/// Profile payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<AvatarPayload>,
}

impl From<Profile> for ProfilePayload {
    fn from(profile: Profile) -> Self {
        let avatar = profile.avatar_src.map(|src| AvatarPayload {
            src,
            alt: profile.avatar_alt,
        });
        Self {
            full_name: profile.full_name,
            email: profile.email,
            phone: profile.phone,
            avatar,
        }
    }
}

/// Profile update body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Password change body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
}

/// Current user's profile.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ProfilePayload>> {
    let profile = profiles::get_by_user(state.pool(), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_string()))?;

    Ok(Json(ProfilePayload::from(profile)))
}

/// Update contact details.
#[instrument(skip(state, user, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfilePayload>> {
    let email = normalize(form.email);
    if let Some(email) = &email {
        Email::parse(email).map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    }

    let phone = normalize(form.phone);
    if let Some(phone) = &phone {
        Phone::parse(phone).map_err(|e| AppError::BadRequest(format!("invalid phone: {e}")))?;
    }

    let profile = profiles::upsert_contact(
        state.pool(),
        user.id,
        form.full_name.trim(),
        email.as_deref(),
        phone.as_deref(),
    )
    .await?;

    Ok(Json(ProfilePayload::from(profile)))
}

/// Upload a new avatar image.
///
/// The file lands under `{media_root}/avatars/user_{id}/` with a generated
/// name; the previous file is deleted best-effort once the database points
/// at the new one.
#[instrument(skip(state, user, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "invalid file format, only image files are allowed".to_string(),
            ));
        }

        let extension = field
            .file_name()
            .and_then(file_extension)
            .ok_or_else(|| {
                AppError::BadRequest("unsupported image file extension".to_string())
            })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        upload = Some((extension, bytes.to_vec()));
        break;
    }

    let Some((extension, bytes)) = upload else {
        return Err(AppError::BadRequest("no avatar file found".to_string()));
    };

    let file_name = format!("{}.{extension}", Uuid::new_v4());
    let relative = format!("avatars/user_{}/{file_name}", user.id);
    let disk_path = state.config().media_root.join(&relative);

    if let Some(parent) = disk_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(format!("create media directory: {e}")))?;
    }
    tokio::fs::write(&disk_path, &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("write avatar: {e}")))?;

    let src = format!("/media/{relative}");
    let previous = profiles::set_avatar(state.pool(), user.id, &src, "Avatar image").await?;

    // Old file is unreferenced now; removal failures only cost disk space
    if let Some(previous) = previous
        && let Some(path) = media_disk_path(&state.config().media_root, &previous)
        && let Err(e) = tokio::fs::remove_file(&path).await
    {
        tracing::debug!("failed to remove old avatar {}: {e}", path.display());
    }

    Ok(Json(json!({ "message": "avatar uploaded", "src": src })))
}

/// Change the password.
#[instrument(skip(state, user, form))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<PasswordForm>,
) -> Result<StatusCode> {
    if form.current_password.is_empty() || form.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "current and new password are required".to_string(),
        ));
    }

    let auth = AuthService::new(state.pool());
    auth.change_password(user.id, &form.current_password, &form.new_password)
        .await?;

    tracing::info!(user = %user.id, "password changed");

    Ok(StatusCode::OK)
}

/// Treat blank strings as absent.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Extract and validate a lowercase file extension.
fn file_extension(file_name: &str) -> Option<String> {
    let extension = FsPath::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    ALLOWED_AVATAR_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Map a `/media/...` src back to its on-disk path.
fn media_disk_path(media_root: &FsPath, src: &str) -> Option<PathBuf> {
    let relative = src.strip_prefix("/media/")?;
    // Refuse anything that could escape the media root
    if relative.split('/').any(|part| part == ".." || part.is_empty()) {
        return None;
    }
    Some(media_root.join(relative))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Some("  a@b.c ".to_string())), Some("a@b.c".to_string()));
        assert_eq!(normalize(Some("   ".to_string())), None);
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("me.PNG"), Some("png".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), None);
        assert_eq!(file_extension("no-extension"), None);
        assert_eq!(file_extension("script.sh"), None);
    }

    #[test]
    fn test_media_disk_path() {
        let root = FsPath::new("media");
        assert_eq!(
            media_disk_path(root, "/media/avatars/user_1/a.png"),
            Some(PathBuf::from("media/avatars/user_1/a.png"))
        );
        assert_eq!(media_disk_path(root, "/media/../etc/passwd"), None);
        assert_eq!(media_disk_path(root, "/elsewhere/a.png"), None);
    }
}
