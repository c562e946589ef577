//! Cognito Identity Pool Role Sync
//!
//! Makes an identity pool route every token-authenticated user, from every
//! configured provider, to one authenticated IAM role.

pub mod config;
pub mod error;
pub mod identity_pool;
pub mod synchronizer;

pub use config::{Cli, SyncConfig};
pub use error::SyncError;
pub use identity_pool::IdentityPoolClient;
pub use synchronizer::RoleSynchronizer;
