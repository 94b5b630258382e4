//! Best-effort remote mirroring.
//!
//! The local bucket store is the source of truth; every function here either
//! succeeds quietly or logs a warning and gives up. A missing signed-in user
//! skips the mirror without attempting a request. Nothing in this module can
//! change the outcome of a lifecycle operation.

use serde_json::Map;
use tracing::warn;

use coverquote_core::domain::quote::Quote;
use coverquote_store::{AuthSession, RemoteDocumentStore};

pub(crate) const QUOTES_COLLECTION: &str = "quoteSubmissions";
pub(crate) const SAVED_COLLECTION: &str = "savedQuotes";

/// Upsert the full quote document, modification history included.
pub(crate) async fn quote_document(
    remote: &dyn RemoteDocumentStore,
    auth: &dyn AuthSession,
    quote: &Quote,
) {
    if auth.current_user().is_none() {
        return;
    }

    let document = match serde_json::to_value(quote) {
        Ok(document) => document,
        Err(error) => {
            warn!(quote_id = %quote.id, %error, "quote could not be serialized for mirroring");
            return;
        }
    };

    if let Err(error) = remote.create_with_id(QUOTES_COLLECTION, &quote.id.0, document).await {
        warn!(quote_id = %quote.id, %error, "remote mirror failed, local copy remains canonical");
    }
}

/// Merge only the status field into the remote document.
pub(crate) async fn quote_status(
    remote: &dyn RemoteDocumentStore,
    auth: &dyn AuthSession,
    quote: &Quote,
) {
    if auth.current_user().is_none() {
        return;
    }

    let mut fields = Map::new();
    match serde_json::to_value(quote.status) {
        Ok(status) => {
            fields.insert("status".to_string(), status);
        }
        Err(error) => {
            warn!(quote_id = %quote.id, %error, "status could not be serialized for mirroring");
            return;
        }
    }

    if let Err(error) = remote.update(QUOTES_COLLECTION, &quote.id.0, fields).await {
        warn!(quote_id = %quote.id, %error, "remote status mirror failed");
    }
}

pub(crate) async fn saved_membership(
    remote: &dyn RemoteDocumentStore,
    auth: &dyn AuthSession,
    quote_id: &str,
    saved: bool,
) {
    let Some(owner) = auth.current_user() else {
        return;
    };

    let result = if saved {
        remote.add_to_user_collection(SAVED_COLLECTION, &owner, quote_id).await
    } else {
        remote.remove_from_user_collection(SAVED_COLLECTION, &owner, quote_id).await
    };

    if let Err(error) = result {
        warn!(quote_id, %error, saved, "remote saved-set mirror failed");
    }
}
