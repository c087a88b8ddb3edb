use std::sync::Arc;

use cleanco_core::DocumentStore;

use crate::session::TokenSigner;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: AuthConfig,
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, auth: AuthConfig) -> Self {
        Self {
            store,
            auth,
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn signer(&self) -> TokenSigner {
        TokenSigner::new(self.auth.secret.as_bytes(), self.auth.expiration)
    }
}
