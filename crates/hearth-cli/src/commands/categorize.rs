//! Auto-categorization command implementation

use anyhow::{Context, Result};
use hearth_core::config::AGENT_URL_ENV;
use hearth_core::db::Database;
use hearth_core::{run_categorization, HearthConfig, HttpCategorizationAgent};

pub async fn cmd_categorize(db: &Database, config: &HearthConfig) -> Result<()> {
    let Some(agent) = HttpCategorizationAgent::from_config(&config.agent)
        .context("Invalid categorization agent configuration")?
    else {
        println!("💡 No categorization agent configured.");
        println!("   Set [agent] url in hearth.toml or {}", AGENT_URL_ENV);
        return Ok(());
    };

    println!("🤖 Sending uncategorized transactions to {}...", agent.base_url());

    let result = run_categorization(db, &agent)
        .await
        .context("Auto-categorization failed")?;

    println!("   Processed: {}", result.processed);
    println!("   Updated:   {}", result.updated);
    println!("   Known merchants: {}", result.knowledge_size);
    println!("✅ Categorization complete");

    Ok(())
}
