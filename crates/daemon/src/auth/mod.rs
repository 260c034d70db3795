//! Basic-auth credential checks and the guard pipelines that gate each route.

mod basic;
mod guards;
mod pipeline;
mod verifier;

pub use basic::{challenge, Credentials, REALM};
pub use guards::{
    AllowUnseen, Authenticate, AuthorMatch, Guard, RegisterRestriction, RequestContext,
    RestrictedRead, SelfAuthorship,
};
pub use pipeline::{Pipeline, Pipelines};
pub use verifier::{CredentialVerifier, Verification, HASHED_PASSWORD};

use store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization: Basic` header
    #[error("authorization required")]
    MissingCredentials,

    /// Known user, wrong password
    #[error("invalid credentials")]
    Rejected,

    #[error("{0}")]
    Forbidden(String),

    /// The request itself is malformed
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
