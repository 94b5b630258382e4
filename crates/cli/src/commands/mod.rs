pub mod config;
pub mod doctor;
pub mod quotes;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use coverquote_core::config::AppConfig;
use coverquote_lifecycle::QuoteLifecycleManager;
use coverquote_store::{
    AuthSession, DisabledRemoteStore, JsonFileStore, RemoteDocumentStore, RestRemoteStore,
    StaticAuth,
};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Wire the lifecycle manager from configuration: local JSON buckets, a REST
/// remote when mirroring is enabled, and the configured identity (signed out
/// when remote is off, which silently disables every mirror step).
pub(crate) fn build_manager(config: &AppConfig) -> Result<QuoteLifecycleManager, String> {
    let local = Arc::new(JsonFileStore::new(config.storage.data_dir.clone()));

    let (remote, auth): (Arc<dyn RemoteDocumentStore>, Arc<dyn AuthSession>) = if config
        .remote
        .enabled
    {
        let base_url = config.remote.base_url.clone().unwrap_or_default();
        let api_key = config
            .remote
            .api_key
            .clone()
            .ok_or_else(|| "remote.api_key is required when remote.enabled is true".to_string())?;
        let user_id = config
            .remote
            .user_id
            .clone()
            .ok_or_else(|| "remote.user_id is required when remote.enabled is true".to_string())?;

        let store = RestRemoteStore::new(base_url, api_key, config.remote.timeout_secs)
            .map_err(|error| format!("remote store init failed: {error}"))?;
        (Arc::new(store), Arc::new(StaticAuth::signed_in(user_id)))
    } else {
        (Arc::new(DisabledRemoteStore), Arc::new(StaticAuth::signed_out()))
    };

    Ok(QuoteLifecycleManager::new(local, remote, auth))
}
