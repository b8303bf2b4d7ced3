//! Integration tests for authentication and profile management.
//!
//! Run with: cargo test -p ivylane-integration-tests -- --ignored

use ivylane_integration_tests::{base_url, client, sign_up, unique_username};
use reqwest::StatusCode;
use serde_json::{Value, json};

const PASSWORD: &str = "a sufficiently long password";

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_sign_up_then_sign_in() {
    let base = base_url();
    let client = client();
    let username = sign_up(&client, PASSWORD).await;

    // Sign out, then back in with the same credentials
    let resp = client
        .post(format!("{base}/api/sign-out"))
        .send()
        .await
        .expect("sign-out failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base}/api/sign-in"))
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await
        .expect("sign-in failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_sign_in_wrong_password_is_401() {
    let base = base_url();
    let client = client();
    let username = sign_up(&client, PASSWORD).await;

    client
        .post(format!("{base}/api/sign-out"))
        .send()
        .await
        .expect("sign-out failed");

    let resp = client
        .post(format!("{base}/api/sign-in"))
        .json(&json!({ "username": username, "password": "wrong password" }))
        .send()
        .await
        .expect("sign-in failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_duplicate_username_is_409() {
    let base = base_url();
    let client = client();
    let username = unique_username();

    let body = json!({ "name": "Dup", "username": username, "password": PASSWORD });

    let first = client
        .post(format!("{base}/api/sign-up"))
        .json(&body)
        .send()
        .await
        .expect("sign-up failed");
    assert_eq!(first.status(), StatusCode::OK);

    let second = client
        .post(format!("{base}/api/sign-up"))
        .json(&body)
        .send()
        .await
        .expect("sign-up failed");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_profile_roundtrip() {
    let base = base_url();
    let client = client();
    sign_up(&client, PASSWORD).await;

    // Sign-up created an empty profile
    let profile: Value = client
        .get(format!("{base}/api/profile"))
        .send()
        .await
        .expect("profile failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(profile["fullName"], "Test User");
    assert!(profile["avatar"].is_null());

    // Update the contact fields
    let resp = client
        .post(format!("{base}/api/profile"))
        .json(&json!({
            "fullName": "Updated Name",
            "email": "updated@example.com",
            "phone": "+1 555 0101",
        }))
        .send()
        .await
        .expect("profile update failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let profile: Value = client
        .get(format!("{base}/api/profile"))
        .send()
        .await
        .expect("profile failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(profile["fullName"], "Updated Name");
    assert_eq!(profile["email"], "updated@example.com");

    // Garbage contact details are rejected
    let resp = client
        .post(format!("{base}/api/profile"))
        .json(&json!({ "fullName": "X", "email": "not-an-email" }))
        .send()
        .await
        .expect("profile update failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_profile_requires_auth() {
    let resp = client()
        .get(format!("{}/api/profile", base_url()))
        .send()
        .await
        .expect("profile failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_password_change() {
    let base = base_url();
    let client = client();
    let username = sign_up(&client, PASSWORD).await;

    // Same password is rejected
    let resp = client
        .post(format!("{base}/api/profile/password"))
        .json(&json!({ "currentPassword": PASSWORD, "newPassword": PASSWORD }))
        .send()
        .await
        .expect("password change failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Wrong current password is rejected
    let resp = client
        .post(format!("{base}/api/profile/password"))
        .json(&json!({ "currentPassword": "nope nope nope", "newPassword": "another long password" }))
        .send()
        .await
        .expect("password change failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A valid change works, and the new password signs in
    let resp = client
        .post(format!("{base}/api/profile/password"))
        .json(&json!({ "currentPassword": PASSWORD, "newPassword": "another long password" }))
        .send()
        .await
        .expect("password change failed");
    assert_eq!(resp.status(), StatusCode::OK);

    client
        .post(format!("{base}/api/sign-out"))
        .send()
        .await
        .expect("sign-out failed");

    let resp = client
        .post(format!("{base}/api/sign-in"))
        .json(&json!({ "username": username, "password": "another long password" }))
        .send()
        .await
        .expect("sign-in failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_avatar_upload() {
    let base = base_url();
    let client = client();
    sign_up(&client, PASSWORD).await;

    // A 1x1 PNG
    let png: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    let part = reqwest::multipart::Part::bytes(png.to_vec())
        .file_name("avatar.png")
        .mime_str("image/png")
        .expect("valid mime");
    let form = reqwest::multipart::Form::new().part("avatar", part);

    let resp = client
        .post(format!("{base}/api/profile/avatar"))
        .multipart(form)
        .send()
        .await
        .expect("avatar upload failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // The profile now references the uploaded file, and it is served
    let profile: Value = client
        .get(format!("{base}/api/profile"))
        .send()
        .await
        .expect("profile failed")
        .json()
        .await
        .expect("invalid JSON");
    let src = profile["avatar"]["src"].as_str().expect("avatar src");
    assert!(src.starts_with("/media/avatars/"));

    let served = client
        .get(format!("{base}{src}"))
        .send()
        .await
        .expect("media fetch failed");
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_avatar_rejects_non_image() {
    let base = base_url();
    let client = client();
    sign_up(&client, PASSWORD).await;

    let part = reqwest::multipart::Part::bytes(b"#!/bin/sh".to_vec())
        .file_name("avatar.sh")
        .mime_str("text/x-shellscript")
        .expect("valid mime");
    let form = reqwest::multipart::Form::new().part("avatar", part);

    let resp = client
        .post(format!("{base}/api/profile/avatar"))
        .multipart(form)
        .send()
        .await
        .expect("avatar upload failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
