//! Application state management for Pixelport.
//!
//! This module contains the core `App` struct that manages all application
//! state: the session manager, the current view and its form state, and
//! coordination with background image-processing jobs.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::auth::{CredentialStore, SessionError, SessionEvent, SessionManager, TokenStore};
use crate::config::Config;
use crate::models::{OutputFormat, Resize, TransformParams};
use crate::route::{self, RouteDecision, View};
use crate::utils::format::format_bytes;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background job message channel.
/// Image jobs run one at a time in practice; 8 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Largest file accepted for upload, checked locally before any bytes are
/// sent. 10 MiB, matching the server's own limit.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProfileForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub path: String,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ConvertForm {
    pub path: String,
    pub format: OutputFormat,
    pub error: Option<String>,
}

impl Default for ConvertForm {
    fn default() -> Self {
        Self {
            path: String::new(),
            format: OutputFormat::default(),
            error: None,
        }
    }
}

#[derive(Debug)]
pub struct TransformForm {
    pub path: String,
    pub resize: Option<Resize>,
    pub rotate: Option<i32>,
    pub grayscale: bool,
    pub sepia: bool,
    pub format: Option<OutputFormat>,
    pub option_selection: usize,
    pub error: Option<String>,
}

impl Default for TransformForm {
    fn default() -> Self {
        Self {
            path: String::new(),
            resize: None,
            rotate: None,
            grayscale: false,
            sepia: false,
            format: None,
            option_selection: 0,
            error: None,
        }
    }
}

impl TransformForm {
    /// Number of toggleable transform options shown in the view.
    pub const OPTION_COUNT: usize = 5;

    pub fn params(&self) -> TransformParams {
        let mut filters = Vec::new();
        if self.grayscale {
            filters.push("grayscale".to_string());
        }
        if self.sepia {
            filters.push("sepia".to_string());
        }
        TransformParams {
            resize: self.resize,
            rotate: self.rotate,
            crop: None,
            filters,
            format: self.format,
        }
    }
}

// ============================================================================
// Background Job Results
// ============================================================================

/// Results sent back from spawned image-processing jobs.
enum JobResult {
    Uploaded { filename: String },
    Converted { output: PathBuf },
    Transformed { output: PathBuf },
    Failed { operation: &'static str, message: String },
    /// Fresh library listing; produced by a fetch, not a submitted job.
    ImagesListed(Vec<String>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionManager,
    pub api: ApiClient,

    // UI State
    pub state: AppState,
    pub view: View,
    pub focus_index: usize,
    pub status_message: Option<String>,
    /// True while an image job is running; blocks a second submission.
    pub busy: bool,
    /// URLs of the user's uploaded images, shown on the library view.
    pub images: Vec<String>,

    // Per-view form state
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub profile_form: ProfileForm,
    pub upload_form: UploadForm,
    pub convert_form: ConvertForm,
    pub transform_form: TransformForm,

    // Background job channel
    jobs_tx: mpsc::Sender<JobResult>,
    jobs_rx: mpsc::Receiver<JobResult>,
}

impl App {
    /// Create a new application instance. Restores any persisted session and
    /// starts the background revalidation task.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let api = ApiClient::new(config.api_base_url())?;

        let data_dir = config.data_dir().unwrap_or_else(|_| PathBuf::from("."));
        let store = TokenStore::new(data_dir);

        let mut session = SessionManager::new(api.clone(), store);
        session.restore();

        let (jobs_tx, jobs_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var("PIXELPORT_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let view = if session.is_authenticated() {
            route::AUTHENTICATED_LANDING
        } else {
            route::UNAUTHENTICATED_LANDING
        };

        let mut app = Self {
            config,
            session,
            api,

            state: AppState::Normal,
            view,
            focus_index: 0,
            status_message: None,
            busy: false,
            images: Vec::new(),

            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            profile_form: ProfileForm::default(),
            upload_form: UploadForm::default(),
            convert_form: ConvertForm::default(),
            transform_form: TransformForm::default(),

            jobs_tx,
            jobs_rx,
        };
        app.login_form.username = login_username;
        app.login_form.password = std::env::var("PIXELPORT_PASSWORD").unwrap_or_default();
        if app.session.is_authenticated() {
            app.refresh_images();
        }
        Ok(app)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Request a view change, honoring the access gate. Redirects land on the
    /// appropriate view; a pending decision leaves the current view alone
    /// until the session restore resolves.
    pub fn navigate(&mut self, requested: View) {
        match route::decide(
            self.session.is_authenticated(),
            self.session.is_loading(),
            requested,
        ) {
            RouteDecision::Render(view) | RouteDecision::Redirect(view) => {
                // Focus only resets on an actual view change; this runs every
                // tick to re-gate the current view.
                if self.view != view {
                    self.view = view;
                    self.focus_index = 0;
                    if view == View::Home {
                        self.refresh_images();
                    }
                }
            }
            RouteDecision::Pending => {}
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let username = self.login_form.username.trim().to_string();
        let password = self.login_form.password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_form.error = Some("Username and password required".to_string());
            return;
        }

        self.login_form.error = None;

        match self.session.login(&username, &password).await {
            Ok(()) => {
                if let Err(e) = CredentialStore::store(&username, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_form.password.clear();
                self.status_message = None;
                self.navigate(route::AUTHENTICATED_LANDING);
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_form.error = Some("Invalid username or password".to_string());
            }
        }
    }

    /// Attempt account creation with the register form. Success never logs
    /// the user in; a delayed event switches back to the login view.
    pub async fn attempt_register(&mut self) {
        let username = self.register_form.username.trim().to_string();
        let password = self.register_form.password.clone();

        if username.is_empty() || password.is_empty() {
            self.register_form.error = Some("Username and password required".to_string());
            return;
        }
        if username.len() > MAX_USERNAME_LENGTH || password.len() > MAX_PASSWORD_LENGTH {
            self.register_form.error = Some("Username or password too long".to_string());
            return;
        }
        if password != self.register_form.confirm {
            self.register_form.error = Some("Passwords do not match".to_string());
            return;
        }

        self.register_form.error = None;

        match self.session.register(&username, &password).await {
            Ok(()) => {
                self.register_form.success =
                    Some("Account created. Redirecting to login...".to_string());
                // Carry the username over so the login form is prefilled.
                self.login_form.username = username;
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                self.register_form.error =
                    Some("Registration failed. The username may be taken.".to_string());
            }
        }
    }

    /// Change the account password from the profile form. The active session
    /// stays valid either way.
    pub async fn attempt_update_password(&mut self) {
        let current = self.profile_form.current.clone();
        let new = self.profile_form.new.clone();

        if current.is_empty() || new.is_empty() {
            self.profile_form.error = Some("Both passwords required".to_string());
            return;
        }
        if new != self.profile_form.confirm {
            self.profile_form.error = Some("New passwords do not match".to_string());
            return;
        }

        self.profile_form.error = None;
        self.profile_form.success = None;

        match self.session.update_password(&current, &new).await {
            Ok(()) => {
                self.profile_form = ProfileForm::default();
                self.profile_form.success = Some("Password updated".to_string());
            }
            Err(SessionError::SessionInvalid) => {
                self.profile_form.error = Some("Session expired. Log in again.".to_string());
            }
            Err(e) => {
                error!(error = %e, "Password update failed");
                self.profile_form.error =
                    Some("Update failed. Check your current password.".to_string());
            }
        }
    }

    /// Log out and return to the login view.
    pub fn logout(&mut self) {
        self.session.logout();
        self.profile_form = ProfileForm::default();
        self.status_message = Some("Logged out".to_string());
        self.navigate(route::UNAUTHENTICATED_LANDING);
    }

    // =========================================================================
    // Background event processing
    // =========================================================================

    /// Called once per UI tick: drains session events and job results, then
    /// re-gates the current view in case the session state changed.
    pub fn tick(&mut self) {
        let was_authenticated = self.session.is_authenticated();

        for event in self.session.poll_events() {
            match event {
                SessionEvent::RegistrationComplete => {
                    info!("registration redirect");
                    self.register_form = RegisterForm::default();
                    self.navigate(View::Login);
                }
                SessionEvent::Invalidated { .. } => {
                    if was_authenticated && !self.session.is_authenticated() {
                        self.status_message =
                            Some("Session expired. Please log in again.".to_string());
                    }
                }
                SessionEvent::Revalidated(_) => {}
            }
        }

        while let Ok(result) = self.jobs_rx.try_recv() {
            match result {
                JobResult::Uploaded { filename } => {
                    self.busy = false;
                    self.status_message = Some(format!("Uploaded {}", filename));
                    self.upload_form.path.clear();
                    self.refresh_images();
                }
                JobResult::Converted { output } => {
                    self.busy = false;
                    self.status_message = Some(format!("Saved {}", output.display()));
                }
                JobResult::Transformed { output } => {
                    self.busy = false;
                    self.status_message = Some(format!("Saved {}", output.display()));
                }
                JobResult::Failed { operation, message } => {
                    self.busy = false;
                    error!(operation, error = %message, "Image job failed");
                    self.status_message = Some(format!("{} failed: {}", operation, message));
                }
                // A listing is a background fetch, not a submitted job; it
                // must not release the busy flag.
                JobResult::ImagesListed(images) => {
                    self.images = images;
                }
            }
        }

        // Re-run the gate so a mid-session invalidation bounces a protected
        // view back to login.
        self.navigate(self.view);
    }

    // =========================================================================
    // Image jobs
    // =========================================================================

    /// Read and size-check a local file inside a spawned job.
    async fn read_upload_file(path: &Path) -> Result<(String, Vec<u8>), String> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| "Invalid file path".to_string())?
            .to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;

        if metadata.len() > MAX_UPLOAD_BYTES {
            return Err(format!(
                "File is {} (limit {})",
                format_bytes(metadata.len()),
                format_bytes(MAX_UPLOAD_BYTES)
            ));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;

        Ok((filename, bytes))
    }

    /// Output path next to the input: `photo.png` -> `photo-converted.webp`.
    fn output_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        input.with_file_name(format!("{}-{}.{}", stem, suffix, extension))
    }

    fn job_token(&mut self) -> Option<String> {
        match self.session.token() {
            Some(t) => Some(t.to_string()),
            None => {
                self.status_message = Some("Not logged in".to_string());
                None
            }
        }
    }

    /// Refresh the library listing in the background. Failures are logged
    /// and leave the previous listing in place.
    pub fn refresh_images(&mut self) {
        let Some(token) = self.session.token().map(|t| t.to_string()) else {
            return;
        };

        let api = self.api.clone();
        let tx = self.jobs_tx.clone();
        tokio::spawn(async move {
            match api.list_images(&token).await {
                Ok(images) => {
                    if tx.send(JobResult::ImagesListed(images)).await.is_err() {
                        error!("Job channel closed");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Image list fetch failed");
                }
            }
        });
    }

    /// Spawn a background upload of the file named in the upload form.
    pub fn start_upload(&mut self) {
        if self.busy {
            return;
        }
        let path = PathBuf::from(self.upload_form.path.trim());
        if path.as_os_str().is_empty() {
            self.upload_form.error = Some("Enter a file path".to_string());
            return;
        }
        let Some(token) = self.job_token() else { return };

        self.upload_form.error = None;
        self.busy = true;
        self.status_message = Some("Uploading...".to_string());

        let api = self.api.clone();
        let tx = self.jobs_tx.clone();
        tokio::spawn(async move {
            let result = async {
                let (filename, bytes) = Self::read_upload_file(&path).await?;
                api.upload_image(&token, &filename, bytes)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok::<String, String>(filename)
            }
            .await;

            let message = match result {
                Ok(filename) => JobResult::Uploaded { filename },
                Err(message) => JobResult::Failed {
                    operation: "Upload",
                    message,
                },
            };
            if tx.send(message).await.is_err() {
                error!("Job channel closed");
            }
        });
    }

    /// Spawn a background conversion of the file named in the convert form.
    pub fn start_convert(&mut self) {
        if self.busy {
            return;
        }
        let path = PathBuf::from(self.convert_form.path.trim());
        if path.as_os_str().is_empty() {
            self.convert_form.error = Some("Enter a file path".to_string());
            return;
        }
        let Some(token) = self.job_token() else { return };

        self.convert_form.error = None;
        self.busy = true;
        self.status_message = Some("Converting...".to_string());

        let format = self.convert_form.format;
        let api = self.api.clone();
        let tx = self.jobs_tx.clone();
        tokio::spawn(async move {
            let result = async {
                let (filename, bytes) = Self::read_upload_file(&path).await?;
                let blob = api
                    .convert(&token, &filename, bytes, format)
                    .await
                    .map_err(|e| e.to_string())?;

                let output = Self::output_path(&path, "converted", format.extension());
                tokio::fs::write(&output, blob)
                    .await
                    .map_err(|e| format!("Cannot write {}: {}", output.display(), e))?;
                Ok::<PathBuf, String>(output)
            }
            .await;

            let message = match result {
                Ok(output) => JobResult::Converted { output },
                Err(message) => JobResult::Failed {
                    operation: "Convert",
                    message,
                },
            };
            if tx.send(message).await.is_err() {
                error!("Job channel closed");
            }
        });
    }

    /// Spawn a background transform of the file named in the transform form.
    pub fn start_transform(&mut self) {
        if self.busy {
            return;
        }
        let path = PathBuf::from(self.transform_form.path.trim());
        if path.as_os_str().is_empty() {
            self.transform_form.error = Some("Enter a file path".to_string());
            return;
        }
        let params = self.transform_form.params();
        if params.is_empty() {
            self.transform_form.error = Some("Select at least one transformation".to_string());
            return;
        }
        let Some(token) = self.job_token() else { return };

        self.transform_form.error = None;
        self.busy = true;
        self.status_message = Some("Transforming...".to_string());

        // Output keeps the input extension unless the transform changes format.
        let extension = params
            .format
            .map(|f| f.extension().to_string())
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_string())
            })
            .unwrap_or_else(|| "jpg".to_string());

        let api = self.api.clone();
        let tx = self.jobs_tx.clone();
        tokio::spawn(async move {
            let result = async {
                let (filename, bytes) = Self::read_upload_file(&path).await?;
                let blob = api
                    .transform(&token, &filename, bytes, &params)
                    .await
                    .map_err(|e| e.to_string())?;

                let output = Self::output_path(&path, "transformed", &extension);
                tokio::fs::write(&output, blob)
                    .await
                    .map_err(|e| format!("Cannot write {}: {}", output.display(), e))?;
                Ok::<PathBuf, String>(output)
            }
            .await;

            let message = match result {
                Ok(output) => JobResult::Transformed { output },
                Err(message) => JobResult::Failed {
                    operation: "Transform",
                    message,
                },
            };
            if tx.send(message).await.is_err() {
                error!("Job channel closed");
            }
        });
    }

    // =========================================================================
    // Input helpers
    // =========================================================================

    /// Number of focusable fields on the current view, for Tab cycling.
    /// The last index is always the submit button where one exists.
    pub fn field_count(&self) -> usize {
        match self.view {
            View::Login => 3,
            View::Register => 4,
            View::Profile => 4,
            View::Home => 2,
            View::Convert => 3,
            View::Transform => 3,
            View::About => 0,
        }
    }

    pub fn focus_next(&mut self) {
        let count = self.field_count();
        if count > 0 {
            self.focus_index = (self.focus_index + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.field_count();
        if count > 0 {
            self.focus_index = (self.focus_index + count - 1) % count;
        }
    }

    /// Push a character into a bounded text field.
    pub fn push_bounded(field: &mut String, c: char, max_len: usize) {
        if field.len() < max_len {
            field.push(c);
        }
    }

    pub fn max_username_len() -> usize {
        MAX_USERNAME_LENGTH
    }

    pub fn max_password_len() -> usize {
        MAX_PASSWORD_LENGTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_appends_suffix_and_extension() {
        let input = Path::new("/tmp/photo.png");
        assert_eq!(
            App::output_path(input, "converted", "webp"),
            PathBuf::from("/tmp/photo-converted.webp")
        );
        assert_eq!(
            App::output_path(input, "transformed", "png"),
            PathBuf::from("/tmp/photo-transformed.png")
        );
    }

    #[test]
    fn output_path_without_stem_falls_back() {
        let input = Path::new("/tmp/.hidden");
        let output = App::output_path(input, "converted", "jpg");
        assert!(output.to_string_lossy().ends_with("-converted.jpg"));
    }

    #[test]
    fn transform_form_collects_selected_filters() {
        let mut form = TransformForm::default();
        assert!(form.params().is_empty());

        form.grayscale = true;
        form.rotate = Some(90);
        let params = form.params();
        assert_eq!(params.filters, vec!["grayscale".to_string()]);
        assert_eq!(params.rotate, Some(90));
        assert!(!params.is_empty());
    }

    #[test]
    fn push_bounded_respects_limit() {
        let mut field = String::from("ab");
        App::push_bounded(&mut field, 'c', 3);
        App::push_bounded(&mut field, 'd', 3);
        assert_eq!(field, "abc");
    }
}
