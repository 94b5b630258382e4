//! Quote lifecycle manager.
//!
//! Owns the quote collection and the saved-quote set. Every mutation follows
//! the same two-phase write: the authoritative local bucket write must
//! succeed (its failure propagates to the caller), then the remote mirror
//! runs best-effort through [`crate::mirror`]. Lookups for unknown ids
//! report absence through `Option`/`bool`, never through an error.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use coverquote_core::domain::policy::{InsuranceType, PolicyDetails};
use coverquote_core::domain::quote::{Quote, QuoteId, QuoteStatus};
use coverquote_core::errors::DomainError;
use coverquote_core::rating::calculate_premium;
use coverquote_store::{AuthSession, LocalStore, RemoteDocumentStore, StoreError};

use crate::mirror;
use crate::submission::SubmissionForm;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Persistence(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Constructed once at startup with its collaborators injected; holds no
/// state of its own beyond the store handles.
pub struct QuoteLifecycleManager {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteDocumentStore>,
    auth: Arc<dyn AuthSession>,
}

impl QuoteLifecycleManager {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteDocumentStore>,
        auth: Arc<dyn AuthSession>,
    ) -> Self {
        Self { local, remote, auth }
    }

    /// Create a quote from a validated submission: rate it, append it to the
    /// local collection, then mirror it remotely best-effort.
    pub async fn process_submission(
        &self,
        insurance_type: InsuranceType,
        form: SubmissionForm,
    ) -> Result<Quote, LifecycleError> {
        let premium = calculate_premium(&insurance_type, &form.policy_details);
        let quote = Quote {
            id: QuoteId::generate(),
            created_at: chrono::Utc::now(),
            insurance_type,
            customer_info: form.customer_info(),
            policy_details: form.policy_details,
            premium,
            status: QuoteStatus::New,
            modification_history: Vec::new(),
        };

        let mut quotes = self.local.read_quotes()?;
        quotes.push(quote.clone());
        self.local.write_quotes(&quotes)?;

        mirror::quote_document(self.remote.as_ref(), self.auth.as_ref(), &quote).await;

        info!(quote_id = %quote.id, insurance_type = %quote.insurance_type, "quote created");
        Ok(quote)
    }

    /// Replace the policy details of an existing quote. The premium is
    /// recomputed, the prior premium and details are appended to the
    /// modification history, and status moves to `Modified` (also from
    /// `Accepted`; re-opening a bound quote is allowed). Unknown ids return
    /// `Ok(None)`.
    pub async fn modify_quote(
        &self,
        id: &QuoteId,
        updated_details: PolicyDetails,
        notes: Option<String>,
    ) -> Result<Option<Quote>, LifecycleError> {
        let mut quotes = self.local.read_quotes()?;
        let Some(quote) = quotes.iter_mut().find(|quote| &quote.id == id) else {
            return Ok(None);
        };

        let snapshot = quote.snapshot(notes);
        quote.modification_history.push(snapshot);
        quote.policy_details = updated_details;
        quote.premium = calculate_premium(&quote.insurance_type, &quote.policy_details);
        quote.transition_to(QuoteStatus::Modified)?;

        let updated = quote.clone();
        self.local.write_quotes(&quotes)?;

        mirror::quote_document(self.remote.as_ref(), self.auth.as_ref(), &updated).await;

        info!(
            quote_id = %updated.id,
            revisions = updated.modification_history.len(),
            "quote modified"
        );
        Ok(Some(updated))
    }

    /// Mark a quote accepted. Details, premium, and history are untouched.
    /// Returns `false` for unknown ids without writing anything.
    pub async fn accept_quote(&self, id: &QuoteId) -> Result<bool, LifecycleError> {
        let mut quotes = self.local.read_quotes()?;
        let Some(quote) = quotes.iter_mut().find(|quote| &quote.id == id) else {
            return Ok(false);
        };

        quote.transition_to(QuoteStatus::Accepted)?;
        let accepted = quote.clone();
        self.local.write_quotes(&quotes)?;

        mirror::quote_status(self.remote.as_ref(), self.auth.as_ref(), &accepted).await;

        info!(quote_id = %accepted.id, "quote accepted");
        Ok(true)
    }

    /// Add a quote id to the saved set. Idempotent: returns `false` when the
    /// id was already saved and leaves the set untouched.
    pub async fn save_quote(&self, id: &QuoteId) -> Result<bool, LifecycleError> {
        let mut saved = self.local.read_saved_ids()?;
        if saved.contains(id) {
            return Ok(false);
        }

        saved.push(id.clone());
        self.local.write_saved_ids(&saved)?;

        mirror::saved_membership(self.remote.as_ref(), self.auth.as_ref(), &id.0, true).await;
        Ok(true)
    }

    /// Remove a quote id from the saved set. Returns `false` when absent;
    /// the quote record itself is never deleted.
    pub async fn delete_saved_quote(&self, id: &QuoteId) -> Result<bool, LifecycleError> {
        let mut saved = self.local.read_saved_ids()?;
        let before = saved.len();
        saved.retain(|saved_id| saved_id != id);
        if saved.len() == before {
            return Ok(false);
        }

        self.local.write_saved_ids(&saved)?;

        mirror::saved_membership(self.remote.as_ref(), self.auth.as_ref(), &id.0, false).await;
        Ok(true)
    }

    /// All quotes whose id is in the saved set, in collection order.
    pub fn saved_quote_submissions(&self) -> Result<Vec<Quote>, LifecycleError> {
        let saved = self.local.read_saved_ids()?;
        let quotes = self.local.read_quotes()?;
        Ok(quotes.into_iter().filter(|quote| saved.contains(&quote.id)).collect())
    }

    pub fn get_quote(&self, id: &QuoteId) -> Result<Option<Quote>, LifecycleError> {
        let quotes = self.local.read_quotes()?;
        Ok(quotes.into_iter().find(|quote| &quote.id == id))
    }

    pub fn list_quotes(&self) -> Result<Vec<Quote>, LifecycleError> {
        Ok(self.local.read_quotes()?)
    }
}
