//! Application state shared across handlers

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::deal::DealService;
use crate::messaging::MessageLog;
use crate::notify::{LogNotifier, Notifier};
use crate::store::Store;
use crate::vault::{DocumentCipher, DocumentVault, VaultError};

use axum::extract::FromRef;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub deal_service: Arc<DealService>,
    pub document_vault: Arc<DocumentVault>,
    pub message_log: Arc<MessageLog>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        deal_service: Arc<DealService>,
        document_vault: Arc<DocumentVault>,
        message_log: Arc<MessageLog>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            auth_service,
            deal_service,
            document_vault,
            message_log,
            store,
        }
    }

    /// Wire every service over one store with the logging notifier
    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Result<Self, VaultError> {
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
        let cipher = DocumentCipher::from_config(
            config.document_keys.as_deref(),
            &config.environment,
        )?;

        Ok(Self::new(
            Arc::new(AuthService::from_config(store.clone(), config)),
            Arc::new(DealService::new(store.clone(), notifier)),
            Arc::new(DocumentVault::new(
                store.clone(),
                Arc::new(cipher),
                config.max_document_bytes,
            )),
            Arc::new(MessageLog::new(store.clone())),
            store,
        ))
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<DealService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.deal_service.clone()
    }
}

impl FromRef<AppState> for Arc<DocumentVault> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.document_vault.clone()
    }
}

impl FromRef<AppState> for Arc<MessageLog> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.message_log.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}
