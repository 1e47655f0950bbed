// SqlPilot: natural-language questions answered as executed SQL
//
// Usage: sqlpilot <question...>
// Configuration comes from the environment (.env honored); see config.

use anyhow::{bail, Context, Result};
use sqlpilot::agent::Orchestrator;
use sqlpilot::config::AppConfig;
use sqlpilot::database::{DatabaseGateway, DatabasePool};
use sqlpilot::llm::ProviderSelector;
use sqlpilot::tools::database_tools;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlpilot=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        bail!("usage: sqlpilot <question>");
    }

    let config = AppConfig::from_env().context("loading configuration")?;

    let pool = DatabasePool::from_url(&config.database_url)
        .await
        .context("connecting to database")?;
    pool.test_connection().await.context("probing database")?;
    info!(backend = %pool.backend(), "database connected");

    let gateway = Arc::new(DatabaseGateway::new(pool, config.query_timeout_secs));
    let registry = Arc::new(database_tools(Arc::clone(&gateway))?);

    let selector = Arc::new(ProviderSelector::from_config(&config)?);
    selector
        .initialize()
        .await
        .context("selecting a live provider")?;

    let orchestrator = Orchestrator::new(
        selector,
        registry,
        gateway,
        config.max_tool_iterations,
    );

    let answer = orchestrator.answer_question(&question).await?;
    let output = serde_json::json!({
        "sql": answer.sql,
        "columns": answer.result.columns,
        "rows": answer.result.rows,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
