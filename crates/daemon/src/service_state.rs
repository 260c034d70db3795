use std::sync::Arc;

use axum::extract::FromRef;
use common::prelude::{IdentityProvider, Sha256Identity};
use store::{NounStore, StoreError};

use crate::auth::{CredentialVerifier, Pipelines};
use crate::service_config::Config;

/// Main service state, shared by every request handler
#[derive(Debug, Clone)]
pub struct State {
    store: NounStore,
    identity: Arc<dyn IdentityProvider>,
    pipelines: Arc<Pipelines>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let identity: Arc<dyn IdentityProvider> = Arc::new(Sha256Identity);

        let store = match &config.db_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "opening noun store");
                NounStore::open(path, identity.clone()).await?
            }
            None => {
                tracing::warn!("no database directory configured, nouns are kept in memory");
                NounStore::in_memory(identity.clone())?
            }
        };

        Ok(Self::new(store, identity))
    }

    pub fn new(store: NounStore, identity: Arc<dyn IdentityProvider>) -> Self {
        let verifier = CredentialVerifier::new(store.properties().clone(), identity.clone());
        let pipelines = Arc::new(Pipelines::new(&store, verifier));
        Self {
            store,
            identity,
            pipelines,
        }
    }

    pub fn store(&self) -> &NounStore {
        &self.store
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }
}

impl FromRef<State> for NounStore {
    fn from_ref(state: &State) -> Self {
        state.store.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("noun store setup failed: {0}")]
    Store(#[from] StoreError),
}
