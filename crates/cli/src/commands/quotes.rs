use std::fs;
use std::path::Path;

use serde_json::json;

use coverquote_core::config::{AppConfig, LoadOptions};
use coverquote_core::domain::policy::{InsuranceType, PolicyDetails};
use coverquote_core::domain::quote::{Quote, QuoteId};
use coverquote_lifecycle::{QuoteLifecycleManager, SubmissionForm};

use super::{build_manager, CommandResult};

fn manager_for(command: &str) -> Result<QuoteLifecycleManager, CommandResult> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| CommandResult::failure(command, "config_validation", error.to_string(), 2))?;
    build_manager(&config)
        .map_err(|message| CommandResult::failure(command, "bootstrap", message, 2))
}

fn read_json_file<T: serde::de::DeserializeOwned>(
    command: &str,
    path: &Path,
) -> Result<T, CommandResult> {
    let raw = fs::read_to_string(path).map_err(|error| {
        CommandResult::failure(
            command,
            "input_read",
            format!("could not read `{}`: {error}", path.display()),
            2,
        )
    })?;

    serde_json::from_str(&raw).map_err(|error| {
        CommandResult::failure(
            command,
            "input_parse",
            format!("could not parse `{}`: {error}", path.display()),
            2,
        )
    })
}

fn quote_payload(quote: &Quote) -> serde_json::Value {
    serde_json::to_value(quote).unwrap_or_else(|_| json!({ "id": quote.id.0 }))
}

pub async fn submit(insurance_type: &str, form_path: &Path) -> CommandResult {
    const COMMAND: &str = "submit";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };
    let form: SubmissionForm = match read_json_file(COMMAND, form_path) {
        Ok(form) => form,
        Err(result) => return result,
    };

    match manager.process_submission(InsuranceType::parse(insurance_type), form).await {
        Ok(quote) => CommandResult::success_with_data(
            COMMAND,
            format!(
                "quote {} created, annual premium {}",
                quote.id, quote.premium.annual_premium
            ),
            Some(quote_payload(&quote)),
        ),
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

pub async fn modify(id: &str, details_path: &Path, notes: Option<String>) -> CommandResult {
    const COMMAND: &str = "modify";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };
    let details: PolicyDetails = match read_json_file(COMMAND, details_path) {
        Ok(details) => details,
        Err(result) => return result,
    };

    match manager.modify_quote(&QuoteId(id.to_string()), details, notes).await {
        Ok(Some(quote)) => CommandResult::success_with_data(
            COMMAND,
            format!(
                "quote {} modified, annual premium now {}, {} revision(s) on record",
                quote.id,
                quote.premium.annual_premium,
                quote.modification_history.len()
            ),
            Some(quote_payload(&quote)),
        ),
        Ok(None) => CommandResult::failure(COMMAND, "not_found", format!("no quote `{id}`"), 1),
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

pub async fn accept(id: &str) -> CommandResult {
    const COMMAND: &str = "accept";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };

    match manager.accept_quote(&QuoteId(id.to_string())).await {
        Ok(true) => CommandResult::success(COMMAND, format!("quote {id} accepted")),
        Ok(false) => CommandResult::failure(COMMAND, "not_found", format!("no quote `{id}`"), 1),
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

pub async fn save(id: &str) -> CommandResult {
    const COMMAND: &str = "save";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };

    match manager.save_quote(&QuoteId(id.to_string())).await {
        Ok(true) => CommandResult::success(COMMAND, format!("quote {id} saved")),
        Ok(false) => CommandResult::success(COMMAND, format!("quote {id} was already saved")),
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

pub async fn unsave(id: &str) -> CommandResult {
    const COMMAND: &str = "unsave";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };

    match manager.delete_saved_quote(&QuoteId(id.to_string())).await {
        Ok(true) => CommandResult::success(COMMAND, format!("quote {id} removed from saved set")),
        Ok(false) => {
            CommandResult::failure(COMMAND, "not_found", format!("quote `{id}` was not saved"), 1)
        }
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

pub fn list() -> CommandResult {
    const COMMAND: &str = "list";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };

    match manager.list_quotes() {
        Ok(quotes) => {
            let summaries: Vec<_> = quotes.iter().map(summary_payload).collect();
            CommandResult::success_with_data(
                COMMAND,
                format!("{} quote(s)", quotes.len()),
                Some(json!(summaries)),
            )
        }
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

pub fn show(id: &str) -> CommandResult {
    const COMMAND: &str = "show";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };

    match manager.get_quote(&QuoteId(id.to_string())) {
        Ok(Some(quote)) => CommandResult::success_with_data(
            COMMAND,
            format!("quote {id}"),
            Some(quote_payload(&quote)),
        ),
        Ok(None) => CommandResult::failure(COMMAND, "not_found", format!("no quote `{id}`"), 1),
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

pub fn saved() -> CommandResult {
    const COMMAND: &str = "saved";

    let manager = match manager_for(COMMAND) {
        Ok(manager) => manager,
        Err(result) => return result,
    };

    match manager.saved_quote_submissions() {
        Ok(quotes) => {
            let summaries: Vec<_> = quotes.iter().map(summary_payload).collect();
            CommandResult::success_with_data(
                COMMAND,
                format!("{} saved quote(s)", quotes.len()),
                Some(json!(summaries)),
            )
        }
        Err(error) => CommandResult::failure(COMMAND, "persistence", error.to_string(), 1),
    }
}

fn summary_payload(quote: &Quote) -> serde_json::Value {
    json!({
        "id": quote.id.0,
        "insurance_type": quote.insurance_type.as_str(),
        "customer": quote.customer_info.name,
        "status": quote.status,
        "annual_premium": quote.premium.annual_premium,
        "monthly_premium": quote.premium.monthly_premium,
        "revisions": quote.modification_history.len(),
    })
}
