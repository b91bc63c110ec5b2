//! HTTP client for the Pixelport image processing API.
//!
//! Authentication endpoints exchange JSON credential bodies for an opaque
//! bearer token; image endpoints take multipart uploads and return either
//! JSON metadata or the processed image as a binary blob.
//!
//! Credentials are attached per request. There is no default authorization
//! header on the shared client, so unrelated in-flight requests can never
//! observe a half-switched credential.

use anyhow::{Context, Result};
use reqwest::{multipart, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{TransformParams, User};

use super::ApiError;

/// HTTP request timeout in seconds.
/// Generous enough for large image round-trips while still failing eventually.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Multipart field name for the image payload.
const FILE_FIELD: &str = "file";

#[derive(Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ImageListBody {
    images: Vec<String>,
}

#[derive(Serialize)]
struct PasswordChangeBody<'a> {
    #[serde(rename = "currentPassword")]
    current_password: &'a str,
    #[serde(rename = "newPassword")]
    new_password: &'a str,
}

/// API client for the Pixelport service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if a response is successful, capturing status and body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    // ===== Authentication =====

    /// Exchange credentials for a bearer token.
    /// The response body is the opaque token itself, not a JSON document.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&CredentialsBody { username, password })
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        let token = response
            .text()
            .await
            .context("Failed to read login response body")?;

        Ok(token.trim().to_string())
    }

    /// Create an account. Any token in the response is deliberately ignored;
    /// registration never authenticates the caller.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("/register"))
            .json(&CredentialsBody { username, password })
            .send()
            .await
            .context("Failed to send registration request")?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Change the password for the account behind `token`.
    /// The current session token stays valid afterwards.
    pub async fn update_password(&self, token: &str, current: &str, new: &str) -> Result<()> {
        let response = self
            .client
            .put(self.url("/update-password"))
            .bearer_auth(token)
            .json(&PasswordChangeBody {
                current_password: current,
                new_password: new,
            })
            .send()
            .await
            .context("Failed to send password update request")?;

        // The contract is an exact 200, not any 2xx.
        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }
        Ok(())
    }

    /// Fetch the identity behind a token. Any failure means the token is no
    /// longer usable as a session credential.
    pub async fn fetch_current_user(&self, token: &str) -> Result<User> {
        let response = self
            .client
            .get(self.url("/user"))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to fetch current user")?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .context("Failed to parse current user response")
    }

    // ===== Image operations =====

    fn file_part(filename: &str, bytes: Vec<u8>) -> Result<multipart::Part> {
        multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .context("Failed to build multipart file part")
    }

    /// List the URLs of the user's uploaded images.
    pub async fn list_images(&self, token: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("/images"))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to fetch image list")?;

        let response = Self::check_response(response).await?;

        let body: ImageListBody = response
            .json()
            .await
            .context("Failed to parse image list")?;
        debug!(count = body.images.len(), "image list fetched");
        Ok(body.images)
    }

    /// Upload an image to the user's library.
    pub async fn upload_image(&self, token: &str, filename: &str, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();
        let form = multipart::Form::new().part(FILE_FIELD, Self::file_part(filename, bytes)?);

        let response = self
            .client
            .post(self.url("/images"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;

        Self::check_response(response).await?;
        debug!(filename, size, "image uploaded");
        Ok(())
    }

    /// Convert an image to another format. Returns the converted bytes.
    pub async fn convert(
        &self,
        token: &str,
        filename: &str,
        bytes: Vec<u8>,
        format: crate::models::OutputFormat,
    ) -> Result<Vec<u8>> {
        let form = multipart::Form::new()
            .part(FILE_FIELD, Self::file_part(filename, bytes)?)
            .text("format", format.extension());

        let response = self
            .client
            .post(self.url("/convert"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send convert request")?;

        let response = Self::check_response(response).await?;

        let blob = response
            .bytes()
            .await
            .context("Failed to read converted image")?;
        debug!(filename, output_bytes = blob.len(), "image converted");
        Ok(blob.to_vec())
    }

    /// Apply server-side transforms to an image. The parameter object is
    /// JSON-encoded into the `transformations` field. Returns the result bytes.
    pub async fn transform(
        &self,
        token: &str,
        filename: &str,
        bytes: Vec<u8>,
        params: &TransformParams,
    ) -> Result<Vec<u8>> {
        let encoded =
            serde_json::to_string(params).context("Failed to encode transform parameters")?;

        let form = multipart::Form::new()
            .part(FILE_FIELD, Self::file_part(filename, bytes)?)
            .text("transformations", encoded);

        let response = self
            .client
            .post(self.url("/transform"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send transform request")?;

        let response = Self::check_response(response).await?;

        let blob = response
            .bytes()
            .await
            .context("Failed to read transformed image")?;
        debug!(filename, output_bytes = blob.len(), "image transformed");
        Ok(blob.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let api = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(api.url("/login"), "http://localhost:8080/login");
    }

    #[test]
    fn credentials_body_uses_wire_field_names() {
        let body = CredentialsBody {
            username: "alice",
            password: "pw",
        };
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["password"], "pw");
    }

    #[test]
    fn image_list_body_reads_the_images_field() {
        let body: ImageListBody =
            serde_json::from_str(r#"{"images": ["/u/1/cat.png", "/u/1/dog.jpg"]}"#).unwrap();
        assert_eq!(body.images.len(), 2);
        assert_eq!(body.images[0], "/u/1/cat.png");
    }

    #[test]
    fn password_change_body_uses_camel_case() {
        let body = PasswordChangeBody {
            current_password: "old",
            new_password: "new",
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("currentPassword"));
        assert!(json.contains("newPassword"));
    }
}
