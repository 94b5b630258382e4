use std::fs;

use serde::Serialize;

use coverquote_core::config::{AppConfig, LoadOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_data_dir(&config));
            checks.push(check_remote_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "data_dir_writable",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "remote_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_ok =
        checks.iter().all(|check| matches!(check.status, CheckStatus::Pass | CheckStatus::Skipped));
    let overall_status = if all_ok { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_ok {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_data_dir(config: &AppConfig) -> DoctorCheck {
    let dir = &config.storage.data_dir;
    if let Err(error) = fs::create_dir_all(dir) {
        return DoctorCheck {
            name: "data_dir_writable",
            status: CheckStatus::Fail,
            details: format!("could not create `{}`: {error}", dir.display()),
        };
    }

    let probe = dir.join(".doctor-probe");
    let result = fs::write(&probe, b"ok").and_then(|()| fs::remove_file(&probe));
    match result {
        Ok(()) => DoctorCheck {
            name: "data_dir_writable",
            status: CheckStatus::Pass,
            details: format!("`{}` is writable", dir.display()),
        },
        Err(error) => DoctorCheck {
            name: "data_dir_writable",
            status: CheckStatus::Fail,
            details: format!("could not write probe file in `{}`: {error}", dir.display()),
        },
    }
}

fn check_remote_readiness(config: &AppConfig) -> DoctorCheck {
    if !config.remote.enabled {
        return DoctorCheck {
            name: "remote_readiness",
            status: CheckStatus::Skipped,
            details: "remote mirroring is disabled".to_string(),
        };
    }

    // Credentials and URL shape were already validated by config loading;
    // reachability is not probed here because mirror failures are soft.
    DoctorCheck {
        name: "remote_readiness",
        status: CheckStatus::Pass,
        details: "remote credentials present, base URL validated by config contract".to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skipped => "SKIP",
        };
        lines.push(format!("  [{marker}] {} - {}", check.name, check.details));
    }
    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
