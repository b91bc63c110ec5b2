//! Authentication and session lifecycle.
//!
//! [`SessionManager`] owns the in-memory session and the background
//! revalidation task, [`TokenStore`] persists the token across runs, and
//! [`CredentialStore`] optionally remembers the password in the OS keychain.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::CredentialStore;
pub use session::{SessionError, SessionEvent, SessionManager};
pub use store::{StoredSession, TokenStore};
