use async_trait::async_trait;
use common::prelude::{is_user_tag, Envelope};
use store::SetStore;

use super::basic::Credentials;
use super::verifier::{CredentialVerifier, Verification};
use super::AuthError;

/// Everything a guard may inspect or enrich while gating one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The tag being read or written. Restriction registration may rewrite it.
    pub tag: String,
    pub credentials: Option<Credentials>,
    /// Whether an unseen usertag may be admitted on this request.
    pub allow_unseen: bool,
    /// Set once credentials have been verified.
    pub user: Option<String>,
    /// The parsed body of a JSON write.
    pub noun: Option<Envelope>,
    /// The envelope timestamp, recorded for the write receipt.
    pub timestamp: Option<i64>,
}

impl RequestContext {
    pub fn new(tag: impl Into<String>, credentials: Option<Credentials>) -> Self {
        Self {
            tag: tag.into(),
            credentials,
            ..Default::default()
        }
    }

    pub fn with_noun(mut self, noun: Envelope) -> Self {
        self.noun = Some(noun);
        self
    }

    fn authenticated_user(&self) -> Result<&str, AuthError> {
        self.user.as_deref().ok_or(AuthError::MissingCredentials)
    }

    fn envelope(&self) -> Result<&Envelope, AuthError> {
        self.noun
            .as_ref()
            .ok_or_else(|| AuthError::Invalid("a JSON body is required".to_string()))
    }
}

/// One step of an authorization pipeline.
///
/// A guard either hands the (possibly enriched) context on or stops the
/// request with an error.
#[async_trait]
pub trait Guard: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: RequestContext) -> Result<RequestContext, AuthError>;
}

/// Lets the verifier admit a usertag it has never seen.
#[derive(Debug, Clone, Copy)]
pub struct AllowUnseen;

#[async_trait]
impl Guard for AllowUnseen {
    fn name(&self) -> &'static str {
        "allow-unseen"
    }

    async fn check(&self, mut ctx: RequestContext) -> Result<RequestContext, AuthError> {
        ctx.allow_unseen = true;
        Ok(ctx)
    }
}

#[derive(Debug, Clone)]
pub struct Authenticate {
    verifier: CredentialVerifier,
}

impl Authenticate {
    pub fn new(verifier: CredentialVerifier) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Guard for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn check(&self, mut ctx: RequestContext) -> Result<RequestContext, AuthError> {
        let credentials = ctx
            .credentials
            .as_ref()
            .ok_or(AuthError::MissingCredentials)?;
        match self.verifier.verify(credentials, ctx.allow_unseen).await? {
            Verification::Authenticated(user) => {
                ctx.user = Some(user);
                Ok(ctx)
            }
            Verification::Rejected => Err(AuthError::Rejected),
            Verification::Forbidden => Err(AuthError::Forbidden(format!(
                "unknown user {}",
                credentials.user
            ))),
        }
    }
}

/// Only the user named by the tag may write it.
#[derive(Debug, Clone, Copy)]
pub struct SelfAuthorship;

#[async_trait]
impl Guard for SelfAuthorship {
    fn name(&self) -> &'static str {
        "self-authorship"
    }

    async fn check(&self, ctx: RequestContext) -> Result<RequestContext, AuthError> {
        let user = ctx.authenticated_user()?;
        if user != ctx.tag {
            return Err(AuthError::Forbidden(format!(
                "{} may not write {}",
                user, ctx.tag
            )));
        }
        Ok(ctx)
    }
}

/// The body's claimed author must be the authenticated user.
#[derive(Debug, Clone, Copy)]
pub struct AuthorMatch;

#[async_trait]
impl Guard for AuthorMatch {
    fn name(&self) -> &'static str {
        "author-match"
    }

    async fn check(&self, mut ctx: RequestContext) -> Result<RequestContext, AuthError> {
        let user = ctx.authenticated_user()?;
        let envelope = ctx.envelope()?;
        match envelope.user_tag() {
            Some(author) if author == user => {}
            Some(author) => {
                return Err(AuthError::Forbidden(format!(
                    "{} may not write as {}",
                    user, author
                )))
            }
            None => {
                return Err(AuthError::Forbidden(format!(
                    "{} must be named as userTag",
                    user
                )))
            }
        }
        let timestamp = envelope.timestamp();
        ctx.timestamp = timestamp;
        Ok(ctx)
    }
}

/// Reads of a restricted place require membership in its restriction set.
#[derive(Debug, Clone)]
pub struct RestrictedRead {
    restrictions: SetStore,
}

impl RestrictedRead {
    pub fn new(restrictions: SetStore) -> Self {
        Self { restrictions }
    }
}

#[async_trait]
impl Guard for RestrictedRead {
    fn name(&self) -> &'static str {
        "restricted-read"
    }

    async fn check(&self, ctx: RequestContext) -> Result<RequestContext, AuthError> {
        let user = ctx.authenticated_user()?;
        if !self.restrictions.is_member(&ctx.tag, user).await? {
            return Err(AuthError::Forbidden(format!(
                "{} may not read {}",
                user, ctx.tag
            )));
        }
        Ok(ctx)
    }
}

/// Records the body's `restriction` list and moves the write to `!<tag>`.
#[derive(Debug, Clone)]
pub struct RegisterRestriction {
    restrictions: SetStore,
}

impl RegisterRestriction {
    pub fn new(restrictions: SetStore) -> Self {
        Self { restrictions }
    }
}

#[async_trait]
impl Guard for RegisterRestriction {
    fn name(&self) -> &'static str {
        "register-restriction"
    }

    async fn check(&self, mut ctx: RequestContext) -> Result<RequestContext, AuthError> {
        let allowed = ctx
            .envelope()?
            .restriction()
            .map_err(|e| AuthError::Invalid(e.to_string()))?;
        if allowed.is_empty() {
            return Ok(ctx);
        }
        if let Some(bad) = allowed.iter().find(|user| !is_user_tag(user)) {
            return Err(AuthError::Invalid(format!(
                "restriction entry {:?} is not a usertag",
                bad
            )));
        }
        for user in &allowed {
            self.restrictions.add_member(&ctx.tag, user).await?;
        }
        ctx.tag = format!("!{}", ctx.tag);
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use common::prelude::{IdentityProvider, Sha256Identity};
    use serde_json::json;
    use store::NounStore;

    const ALICE: &str = "aaaaaaaa-0000-4000-8000-000000000001";
    const BOB: &str = "bbbbbbbb-0000-4000-8000-000000000002";

    fn store() -> NounStore {
        let identity: Arc<dyn IdentityProvider> = Arc::new(Sha256Identity);
        NounStore::in_memory(identity).unwrap()
    }

    fn as_user(tag: &str, user: &str) -> RequestContext {
        let mut ctx = RequestContext::new(tag, None);
        ctx.user = Some(user.to_string());
        ctx
    }

    #[tokio::test]
    async fn test_self_authorship() {
        assert!(SelfAuthorship.check(as_user(ALICE, ALICE)).await.is_ok());
        assert!(matches!(
            SelfAuthorship.check(as_user(ALICE, BOB)).await,
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            SelfAuthorship.check(RequestContext::new(ALICE, None)).await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_author_match_records_timestamp() {
        let noun = Envelope::from_value(json!({"a": 1, "userTag": ALICE, "timestamp": 7})).unwrap();
        let ctx = AuthorMatch
            .check(as_user("t", ALICE).with_noun(noun.clone()))
            .await
            .unwrap();
        assert_eq!(ctx.timestamp, Some(7));

        assert!(matches!(
            AuthorMatch.check(as_user("t", BOB).with_noun(noun)).await,
            Err(AuthError::Forbidden(_))
        ));

        let anonymous = Envelope::from_value(json!({"a": 1})).unwrap();
        assert!(matches!(
            AuthorMatch.check(as_user("t", ALICE).with_noun(anonymous)).await,
            Err(AuthError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_register_then_read_restriction() {
        let store = store();
        let register = RegisterRestriction::new(store.restrictions().clone());
        let read = RestrictedRead::new(store.restrictions().clone());

        let noun = Envelope::from_value(json!({"restriction": [BOB], "userTag": ALICE})).unwrap();
        let ctx = register
            .check(as_user("p", ALICE).with_noun(noun))
            .await
            .unwrap();
        assert_eq!(ctx.tag, "!p");

        assert!(read.check(as_user("p", BOB)).await.is_ok());
        assert!(matches!(
            read.check(as_user("p", ALICE)).await,
            Err(AuthError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_unrestricted_place_keeps_tag() {
        let store = store();
        let register = RegisterRestriction::new(store.restrictions().clone());
        let noun = Envelope::from_value(json!({"name": "square", "userTag": ALICE})).unwrap();
        let ctx = register
            .check(as_user("p", ALICE).with_noun(noun))
            .await
            .unwrap();
        assert_eq!(ctx.tag, "p");
        assert!(!store.restrictions().has_scope("p").await.unwrap());
    }

    #[tokio::test]
    async fn test_restriction_entries_must_be_usertags() {
        let store = store();
        let register = RegisterRestriction::new(store.restrictions().clone());
        let noun = Envelope::from_value(json!({"restriction": "bob"})).unwrap();
        assert!(matches!(
            register.check(as_user("p", ALICE).with_noun(noun)).await,
            Err(AuthError::Invalid(_))
        ));
        assert!(!store.restrictions().has_scope("p").await.unwrap());
    }
}
