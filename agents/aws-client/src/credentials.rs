//! AWS credentials
//!
//! Static keys come from the standard `AWS_*` environment variables. When
//! they are absent, [`crate::sts::base_credentials`] falls back to a web
//! identity. Temporary credentials are produced by [`crate::sts::assume_role`].

use crate::error::{Error, Result};

pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// Access key pair with an optional session token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    /// Read static keys through a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let access_key_id =
            non_empty(ACCESS_KEY_ID_VAR).ok_or(Error::MissingCredentials(ACCESS_KEY_ID_VAR))?;
        let secret_access_key = non_empty(SECRET_ACCESS_KEY_VAR)
            .ok_or(Error::MissingCredentials(SECRET_ACCESS_KEY_VAR))?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: non_empty(SESSION_TOKEN_VAR),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
