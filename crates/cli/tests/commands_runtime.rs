use std::env;
use std::fs;
use std::future::Future;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use tempfile::TempDir;

use coverquote_cli::commands::{doctor, quotes};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn with_env<T>(vars: &[(&str, &str)], body: impl FnOnce() -> T) -> T {
    let _guard = match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    for (key, value) in vars {
        env::set_var(key, value);
    }
    let result = body();
    for (key, _) in vars {
        env::remove_var(key);
    }
    result
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be JSON")
}

const FORM_JSON: &str = r#"{
  "name": "Acme Staffing",
  "email": "ops@acme.example",
  "phone": "555-0100",
  "location": "Austin, TX",
  "policy_details": {
    "kind": "workers-comp",
    "number_of_employees": 10,
    "annual_payroll": "200000",
    "safety_training": true
  }
}"#;

#[test]
fn submit_show_accept_round_trip() {
    let data_dir = TempDir::new().expect("tempdir");
    let form_path = data_dir.path().join("form.json");
    fs::write(&form_path, FORM_JSON).expect("write form");

    with_env(&[("COVERQUOTE_DATA_DIR", &data_dir.path().to_string_lossy())], || {
        let result = block_on(quotes::submit("workers-comp", &form_path));
        assert_eq!(result.exit_code, 0, "submit should succeed: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "submit");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["status"], "new");
        assert_eq!(payload["data"]["premium"]["annual_premium"], "5550.00");

        let id = payload["data"]["id"].as_str().expect("quote id").to_string();

        let shown = quotes::show(&id);
        assert_eq!(shown.exit_code, 0);
        let shown_payload = parse_payload(&shown.output);
        assert_eq!(shown_payload["data"]["id"], id.as_str());

        let accepted = block_on(quotes::accept(&id));
        assert_eq!(accepted.exit_code, 0, "accept should succeed: {}", accepted.output);

        let after = parse_payload(&quotes::show(&id).output);
        assert_eq!(after["data"]["status"], "accepted");
    });
}

#[test]
fn accept_unknown_id_reports_not_found() {
    let data_dir = TempDir::new().expect("tempdir");

    with_env(&[("COVERQUOTE_DATA_DIR", &data_dir.path().to_string_lossy())], || {
        let result = block_on(quotes::accept("no-such-id"));
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn submit_with_missing_form_file_reports_input_error() {
    let data_dir = TempDir::new().expect("tempdir");

    with_env(&[("COVERQUOTE_DATA_DIR", &data_dir.path().to_string_lossy())], || {
        let result =
            block_on(quotes::submit("workers-comp", data_dir.path().join("absent.json").as_path()));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "input_read");
    });
}

#[test]
fn saved_set_commands_round_trip() {
    let data_dir = TempDir::new().expect("tempdir");
    let form_path = data_dir.path().join("form.json");
    fs::write(&form_path, FORM_JSON).expect("write form");

    with_env(&[("COVERQUOTE_DATA_DIR", &data_dir.path().to_string_lossy())], || {
        let submitted = parse_payload(&block_on(quotes::submit("workers-comp", &form_path)).output);
        let id = submitted["data"]["id"].as_str().expect("quote id").to_string();

        assert_eq!(block_on(quotes::save(&id)).exit_code, 0);

        let saved = parse_payload(&quotes::saved().output);
        assert_eq!(saved["message"], "1 saved quote(s)");

        assert_eq!(block_on(quotes::unsave(&id)).exit_code, 0);
        let unsaved_again = block_on(quotes::unsave(&id));
        assert_eq!(unsaved_again.exit_code, 1);
        assert_eq!(parse_payload(&unsaved_again.output)["error_class"], "not_found");
    });
}

#[test]
fn doctor_passes_with_writable_data_dir() {
    let data_dir = TempDir::new().expect("tempdir");

    with_env(&[("COVERQUOTE_DATA_DIR", &data_dir.path().to_string_lossy())], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks array");
        assert!(checks.iter().any(|check| check["name"] == "data_dir_writable"
            && check["status"] == "pass"));
        assert!(checks.iter().any(|check| check["name"] == "remote_readiness"
            && check["status"] == "skipped"));
    });
}
