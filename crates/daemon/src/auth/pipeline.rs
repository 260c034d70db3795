use store::NounStore;

use super::guards::{
    AllowUnseen, Authenticate, AuthorMatch, Guard, RegisterRestriction, RequestContext,
    RestrictedRead, SelfAuthorship,
};
use super::verifier::CredentialVerifier;
use super::AuthError;

/// An ordered list of guards, evaluated fail-fast.
#[derive(Debug, Default)]
pub struct Pipeline {
    guards: Vec<Box<dyn Guard>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard to the end of the pipeline.
    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|guard| guard.name()).collect()
    }

    /// Runs every guard in order. The first failure stops evaluation.
    pub async fn run(&self, mut ctx: RequestContext) -> Result<RequestContext, AuthError> {
        for guard in &self.guards {
            ctx = match guard.check(ctx).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    tracing::debug!(guard = guard.name(), error = %e, "guard refused request");
                    return Err(e);
                }
            };
        }
        Ok(ctx)
    }
}

/// The guard pipeline of every route that needs one. Built once at startup.
#[derive(Debug)]
pub struct Pipelines {
    pub owner_put: Pipeline,
    pub place_read_restricted: Pipeline,
    pub place_put: Pipeline,
    pub allow: Pipeline,
    pub thing_post: Pipeline,
    pub media_post: Pipeline,
}

impl Pipelines {
    pub fn new(store: &NounStore, verifier: CredentialVerifier) -> Self {
        let authenticate = Authenticate::new(verifier);
        let restrictions = store.restrictions().clone();

        Self {
            owner_put: Pipeline::new()
                .with(AllowUnseen)
                .with(authenticate.clone())
                .with(SelfAuthorship)
                .with(AuthorMatch),
            place_read_restricted: Pipeline::new()
                .with(authenticate.clone())
                .with(RestrictedRead::new(restrictions.clone())),
            place_put: Pipeline::new()
                .with(authenticate.clone())
                .with(AuthorMatch)
                .with(RegisterRestriction::new(restrictions)),
            allow: Pipeline::new().with(authenticate.clone()),
            thing_post: Pipeline::new()
                .with(authenticate.clone())
                .with(AuthorMatch),
            media_post: Pipeline::new().with(authenticate),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::Credentials;
    use common::prelude::{IdentityProvider, Sha256Identity};

    fn pipelines() -> Pipelines {
        let identity: Arc<dyn IdentityProvider> = Arc::new(Sha256Identity);
        let store = NounStore::in_memory(identity.clone()).unwrap();
        let verifier = CredentialVerifier::new(store.properties().clone(), identity);
        Pipelines::new(&store, verifier)
    }

    #[test]
    fn test_pipeline_order() {
        let pipelines = pipelines();
        assert_eq!(
            pipelines.owner_put.names(),
            vec!["allow-unseen", "authenticate", "self-authorship", "author-match"]
        );
        assert_eq!(
            pipelines.place_put.names(),
            vec!["authenticate", "author-match", "register-restriction"]
        );
        assert_eq!(pipelines.media_post.names(), vec!["authenticate"]);
    }

    #[tokio::test]
    async fn test_fail_fast() {
        let pipelines = pipelines();
        // Unknown user and no unseen flag: authentication stops the chain.
        let ctx = RequestContext::new("t", Some(Credentials::new("someone", "pw")));
        assert!(matches!(
            pipelines.thing_post.run(ctx).await,
            Err(AuthError::Forbidden(_))
        ));

        let ctx = RequestContext::new("t", None);
        assert!(matches!(
            pipelines.allow.run(ctx).await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_empty_pipeline_passes() {
        let ctx = Pipeline::new()
            .run(RequestContext::new("t", None))
            .await
            .unwrap();
        assert_eq!(ctx.tag, "t");
    }
}
