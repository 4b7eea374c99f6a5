//! cloud-budgets - command line entry point
//!
//! Usage:
//!   cloud-budgets list
//!   cloud-budgets get <budget-name>
//!   cloud-budgets delete <budget-name>
//!   cloud-budgets assume-role <member-account-id>
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::{bail, Context};
use cloud_budgets::{
    api::{BudgetsHttpClient, StsHttpClient},
    config::Config,
    util::to_pretty_json,
    BudgetService, CredentialBroker,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: cloud-budgets <list | get <name> | delete <name> | assume-role <account-id>>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloud_budgets=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or_default();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: region={}, partition={}",
        config.region, config.partition
    );

    match (command, args.get(1)) {
        ("list", None) => {
            let account_id = account_id(&config)?;
            let service = budget_service(&config)?;
            let budgets = service.list_budgets(&account_id).await?;
            println!("{}", to_pretty_json(&budgets)?);
        }
        ("get", Some(name)) => {
            let account_id = account_id(&config)?;
            let service = budget_service(&config)?;
            let (budget, notifications) = service.get_budget(&account_id, name).await?;
            println!(
                "{}",
                to_pretty_json(&serde_json::json!({
                    "Budget": budget,
                    "Notifications": notifications,
                }))?
            );
        }
        ("delete", Some(name)) => {
            let account_id = account_id(&config)?;
            budget_service(&config)?
                .delete_budget(&account_id, name)
                .await?;
            info!("Deleted budget {}", name);
        }
        ("assume-role", Some(member_account_id)) => {
            let sts = StsHttpClient::new(&config)?;
            let broker = CredentialBroker::with_partition(Arc::new(sts), config.partition.clone());
            let credentials = broker.assume_role(member_account_id).await?;
            println!("{}", to_pretty_json(&credentials)?);
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn account_id(config: &Config) -> anyhow::Result<String> {
    config
        .account_id
        .clone()
        .context("AWS_ACCOUNT_ID must be set for budget commands")
}

fn budget_service(config: &Config) -> anyhow::Result<BudgetService> {
    let client = BudgetsHttpClient::new(config)?;
    Ok(BudgetService::new(Arc::new(client)).with_prune_mode(config.prune_mode))
}
