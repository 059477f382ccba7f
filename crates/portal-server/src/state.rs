//! Shared application state.

use std::sync::Arc;

use portal_records::{MemoryRecordStore, MongoRecordStore, RecordStore};
use portal_report::{DriveClient, GoogleDriveClient, ReportCompiler};
use tracing::{info, warn};

use crate::auth::{SessionVerifier, TokenSessionVerifier};
use crate::config::ServerConfig;
use crate::error::Result;

/// Read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub compiler: Arc<ReportCompiler>,
    pub sessions: Arc<dyn SessionVerifier>,
}

impl AppState {
    pub fn new(compiler: ReportCompiler, sessions: Arc<dyn SessionVerifier>) -> Self {
        Self {
            compiler: Arc::new(compiler),
            sessions,
        }
    }

    /// Connect the store and drive named by the config
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let store = open_store(config).await?;
        let mut compiler = ReportCompiler::new(store, config.report_config())
            .with_drive_settings(config.drive.settings());

        if let Some(drive) = open_drive(config) {
            compiler = compiler.with_drive(drive);
        }

        let sessions = TokenSessionVerifier::new(config.auth.session_tokens.iter().cloned());
        if sessions.is_empty() {
            warn!("No session tokens configured; every report request will be rejected");
        }

        Ok(Self::new(compiler, Arc::new(sessions)))
    }
}

/// Fixture if configured, else MongoDB
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn RecordStore>> {
    if let Some(fixture) = &config.store.fixture {
        info!(path = %fixture.display(), "Using JSON fixture record store");
        return Ok(Arc::new(MemoryRecordStore::from_json_file(fixture)?));
    }

    let uri = config
        .store
        .uri
        .as_deref()
        .ok_or_else(|| crate::error::ServerError::config("MONGODB_URI or store.fixture is required"))?;
    let store = MongoRecordStore::connect(uri, &config.store.database, config.store.collections.clone()).await?;
    Ok(Arc::new(store))
}

/// Drive client from the service account, if one is available
pub fn open_drive(config: &ServerConfig) -> Option<Arc<dyn DriveClient>> {
    if config.drive.disabled {
        return None;
    }

    let key = match config.drive.service_account() {
        Ok(Some(key)) => key,
        Ok(None) => {
            warn!("No Google service account configured; uploads will fail");
            return None;
        }
        Err(err) => {
            warn!(code = err.code(), error = %err, "Ignoring unusable service account");
            return None;
        }
    };

    match GoogleDriveClient::new(key) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            warn!(error = %err, "Failed to build drive client");
            None
        }
    }
}
