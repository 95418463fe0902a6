//! Doctor command - validate configuration and show status

use anyhow::Result;
use reputation_engine_adapters::store::SqliteActivityStore;
use reputation_engine_domain::{ActivityStore, PopulationMember};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::{Context, open_store};
use crate::args::DoctorArgs;
use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    store: CheckResult,
    limits: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, ctx: &Context) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        store: CheckResult::error("Not checked"),
        limits: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match ctx.load_config() {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.store = check_store(config, ctx).await;
        report.limits = check_limits(config);
    }

    let checks = [&report.config, &report.store, &report.limits];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_store(config: &AppConfig, ctx: &Context) -> CheckResult {
    if ctx.dataset.is_none() && config.store.backend == StoreBackend::Sqlite {
        return check_sqlite(&config.store.db_path).await;
    }

    let description = match &ctx.dataset {
        Some(path) => format!("dataset {}", path.display()),
        None => match &config.store.dataset_path {
            Some(path) => format!("dataset {}", path.display()),
            None => "dataset (no path)".to_string(),
        },
    };

    let store = match open_store(config, ctx.dataset.as_deref()).await {
        Ok(store) => store,
        Err(e) => return CheckResult::error(format!("Failed to open {}: {:#}", description, e)),
    };

    match store.fetch_population().await {
        Ok(population) => population_check(&description, &population),
        Err(e) => CheckResult::error(format!("Failed to read {}: {}", description, e)),
    }
}

async fn check_sqlite(db_path: &Path) -> CheckResult {
    let description = format!("sqlite {}", db_path.display());

    // opening would create an empty database
    if !db_path.is_file() {
        return CheckResult::error(format!(
            "SQLite database not found: {} (run 'reputation-engine import' first)",
            db_path.display()
        ));
    }

    let store = match SqliteActivityStore::new(db_path).await {
        Ok(store) => store,
        Err(e) => return CheckResult::error(format!("Failed to open {}: {}", description, e)),
    };

    let population = match store.fetch_population().await {
        Ok(population) => population,
        Err(e) => return CheckResult::error(format!("Failed to read {}: {}", description, e)),
    };

    let mut result = population_check(&description, &population);
    match store.comment_kinds().await {
        Ok(kinds) => {
            let kinds: BTreeMap<&str, i64> = kinds
                .into_iter()
                .map(|(kind, count)| (kind.as_str(), count))
                .collect();
            if let Some(serde_json::Value::Object(details)) = result.details.as_mut() {
                details.insert("comment_kinds".to_string(), serde_json::json!(kinds));
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to count comment kinds"),
    }
    result
}

fn population_check(description: &str, population: &[PopulationMember]) -> CheckResult {
    if population.is_empty() {
        return CheckResult::warn(format!("Store {} has no users", description));
    }

    let questions: u64 = population.iter().map(|m| m.question_count).sum();
    let answers: u64 = population.iter().map(|m| m.answer_count).sum();
    CheckResult::ok(format!("Store {}: {} users", description, population.len())).with_details(
        serde_json::json!({
            "users": population.len(),
            "questions": questions,
            "answers": answers,
        }),
    )
}

fn check_limits(config: &AppConfig) -> CheckResult {
    let profile = &config.profile;
    let zero_maxima = [
        ("max_top_tags", profile.max_top_tags),
        ("max_top_posts", profile.max_top_posts),
        ("max_leaderboard", profile.max_leaderboard),
    ]
    .into_iter()
    .filter(|(_, value)| *value == 0)
    .map(|(name, _)| name)
    .collect::<Vec<_>>();

    if !zero_maxima.is_empty() {
        return CheckResult::warn(format!(
            "Limits set to 0 are treated as 1: {}",
            zero_maxima.join(", ")
        ));
    }

    let policy = profile.limit_policy();
    CheckResult::ok(format!(
        "Profile shows {} tags and {} posts; leaderboard shows {}",
        policy.profile_tags(),
        policy.profile_posts(),
        policy.leaderboard(None)
    ))
}

fn print_report(report: &DoctorReport) {
    println!("reputation-engine Doctor Report");
    println!("===============================");
    println!();

    print_check("Config", &report.config);
    print_check("Store", &report.store);
    print_check("Limits", &report.limits);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready! Try: reputation-engine leaderboard");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
