use serde::{Deserialize, Serialize};

/// Identity returned by `GET /user` for the current bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}
