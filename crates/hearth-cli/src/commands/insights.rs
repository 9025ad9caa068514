//! Insight and drill-down command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use hearth_core::db::Database;
use hearth_core::export::write_transactions_csv;
use hearth_core::insights::{
    aggregate, category_label, drill_down, DrillDownPage, Filter, SourceFilter, SpendingInsights,
    TimeRange,
};
use hearth_core::{HearthConfig, PrivacyGate};

use super::truncate;
use crate::cli::FilterArgs;

/// Resolve CLI filter flags against the configured defaults and exclusions
pub fn build_filter(config: &HearthConfig, args: &FilterArgs) -> Result<Filter> {
    let range = args
        .range
        .as_deref()
        .map(str::parse::<TimeRange>)
        .transpose()
        .map_err(|e| anyhow!(e))?;
    let source: SourceFilter = args.source.parse().map_err(|e: String| anyhow!(e))?;

    config
        .insight_filter(
            range,
            args.month,
            args.year,
            source,
            args.category.as_deref(),
        )
        .context("Invalid insight filter")
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Render the trend and distribution as table lines
pub fn render_insights(insights: &SpendingInsights, gate: &PrivacyGate) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("   Month      │        Fixed │     Variable".to_string());
    lines.push("   ───────────┼──────────────┼─────────────".to_string());
    for point in &insights.trend {
        lines.push(format!(
            "   {:<10} │ {:>12} │ {:>12}",
            point.period,
            gate.currency(point.fixed),
            gate.currency(point.variable)
        ));
    }

    let total: f64 = insights.distribution.iter().map(|c| c.value).sum();
    lines.push(String::new());
    lines.push("   Category                 │        Total │  Share".to_string());
    lines.push("   ─────────────────────────┼──────────────┼───────".to_string());
    for entry in &insights.distribution {
        let share = if total != 0.0 {
            entry.value / total * 100.0
        } else {
            0.0
        };
        lines.push(format!(
            "   {:<24} │ {:>12} │ {:>6}",
            truncate(&entry.category, 24),
            gate.currency(entry.value),
            gate.percent(share)
        ));
    }

    lines
}

pub fn cmd_insights(
    db: &Database,
    config: &HearthConfig,
    gate: &PrivacyGate,
    args: &FilterArgs,
    json: bool,
) -> Result<()> {
    let filter = build_filter(config, args)?;
    let snapshot = db.snapshot()?;
    let insights = aggregate(&snapshot.transactions, &snapshot.accounts, &filter, today());

    if json {
        if !gate.is_unlocked() {
            bail!("--json requires the privacy PIN (--pin)");
        }
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if insights.trend.is_empty() {
        println!("No spending in the selected period.");
        return Ok(());
    }

    println!();
    println!("📊 Spending Insights");
    println!();
    for line in render_insights(&insights, gate) {
        println!("{}", line);
    }

    Ok(())
}

pub fn cmd_drilldown(
    db: &Database,
    config: &HearthConfig,
    gate: &PrivacyGate,
    args: &FilterArgs,
    limit: Option<usize>,
    csv: Option<&Path>,
) -> Result<()> {
    let filter = build_filter(config, args)?;
    let snapshot = db.snapshot()?;
    let rows = drill_down(&snapshot.transactions, &snapshot.accounts, &filter, today());

    if let Some(path) = csv {
        if !gate.is_unlocked() {
            bail!("CSV export requires the privacy PIN (--pin)");
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_transactions_csv(file, &rows, &snapshot.accounts)?;
        println!("📄 Exported {} transaction(s) to {}", rows.len(), path.display());
        return Ok(());
    }

    let page = DrillDownPage::new(
        rows,
        limit.unwrap_or(config.insights.drilldown_display_limit),
    );

    if page.total == 0 {
        println!("No transactions match the selected filters.");
        return Ok(());
    }

    println!();
    println!("🔎 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");
    for tx in &page.transactions {
        println!(
            "   [{}] {} │ {:>12} │ {:<18} │ {}",
            tx.id,
            tx.date,
            gate.currency(tx.amount),
            truncate(category_label(tx), 18),
            truncate(&tx.description, 36)
        );
    }

    if page.is_truncated() {
        println!();
        println!(
            "   Showing {} of {} transactions. Use --limit or --csv for the rest.",
            page.transactions.len(),
            page.total
        );
    }

    Ok(())
}
