use std::sync::Arc;

use common::prelude::IdentityProvider;
use store::{PrivatePropertyStore, Result};

use super::basic::Credentials;

/// Private property holding the digest of a user's password.
pub const HASHED_PASSWORD: &str = "hashedPassword";

/// Outcome of checking one set of credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Authenticated(String),
    /// Known user, wrong password.
    Rejected,
    /// Unknown user on a route that does not admit new users.
    Forbidden,
}

/// Checks Basic credentials against stored password digests.
///
/// An unseen usertag is trusted on first use when the route allows it: its
/// password digest is recorded and the request proceeds. Two first logins
/// racing for the same new usertag both succeed and the last write becomes
/// the recorded password.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    properties: PrivatePropertyStore,
    identity: Arc<dyn IdentityProvider>,
}

impl CredentialVerifier {
    pub fn new(properties: PrivatePropertyStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            properties,
            identity,
        }
    }

    pub async fn verify(
        &self,
        credentials: &Credentials,
        allow_unseen: bool,
    ) -> Result<Verification> {
        let user = credentials.user.as_str();
        let supplied = self.identity.digest(credentials.password.as_bytes());

        match self.properties.read(user, HASHED_PASSWORD).await? {
            Some(stored) if stored == supplied => {
                Ok(Verification::Authenticated(user.to_string()))
            }
            Some(_) => {
                tracing::warn!(user, "password mismatch");
                Ok(Verification::Rejected)
            }
            None if allow_unseen => {
                self.properties
                    .write(user, HASHED_PASSWORD, &supplied)
                    .await?;
                tracing::info!(user, "recorded credentials for new user");
                Ok(Verification::Authenticated(user.to_string()))
            }
            None => {
                tracing::warn!(user, "unknown user");
                Ok(Verification::Forbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::Sha256Identity;
    use store::NounStore;

    const USER: &str = "0b6f3f0e-5c7a-4d3b-9d2e-2f6c1a8e9b10";

    fn verifier() -> CredentialVerifier {
        let identity: Arc<dyn IdentityProvider> = Arc::new(Sha256Identity);
        let store = NounStore::in_memory(identity.clone()).unwrap();
        CredentialVerifier::new(store.properties().clone(), identity)
    }

    #[tokio::test]
    async fn test_trust_on_first_use() {
        let verifier = verifier();
        let first = Credentials::new(USER, "one");

        assert_eq!(
            verifier.verify(&first, false).await.unwrap(),
            Verification::Forbidden
        );
        assert_eq!(
            verifier.verify(&first, true).await.unwrap(),
            Verification::Authenticated(USER.to_string())
        );
        // Once recorded, the password is fixed even where unseen users are admitted.
        assert_eq!(
            verifier.verify(&first, false).await.unwrap(),
            Verification::Authenticated(USER.to_string())
        );
        assert_eq!(
            verifier
                .verify(&Credentials::new(USER, "two"), true)
                .await
                .unwrap(),
            Verification::Rejected
        );
    }

    #[tokio::test]
    async fn test_stores_digest_not_password() {
        let identity: Arc<dyn IdentityProvider> = Arc::new(Sha256Identity);
        let store = NounStore::in_memory(identity.clone()).unwrap();
        let verifier = CredentialVerifier::new(store.properties().clone(), identity.clone());

        verifier
            .verify(&Credentials::new(USER, "hunter2"), true)
            .await
            .unwrap();
        let stored = store
            .properties()
            .read(USER, HASHED_PASSWORD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, identity.digest(b"hunter2"));
    }
}
