use crate::infra::InMemoryVendorRepository;
use bloodhound::error::AppError;
use bloodhound::workflows::ledger::CsvLedgerImport;
use bloodhound::workflows::registry::SyntheticRegistry;
use bloodhound::workflows::vendors::{
    Gstin, IngestReport, PortfolioSummary, RiskLevel, ScoringConfig, VendorRecord, VendorService,
};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Purchase ledger export (CSV) with vendor name, GSTIN, amount and tax columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Seed the synthetic registry so repeated runs print the same checks
    #[arg(long)]
    pub(crate) registry_seed: Option<u64>,
    /// Evaluation date for registration ages (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// JSON scoring policy overriding the default weights and thresholds
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of synthetic vendors in the portfolio
    #[arg(long, default_value_t = 12)]
    pub(crate) vendors: usize,
    /// Seed for the synthetic registry and ledger
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Evaluation date for registration ages (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        csv,
        registry_seed,
        today,
        policy,
    } = args;

    let config = match policy {
        Some(path) => ScoringConfig::from_path(path)?,
        None => ScoringConfig::default(),
    };
    let service = VendorService::new(Arc::new(InMemoryVendorRepository::default()), config);

    let import = CsvLedgerImport::from_path(&csv)?;
    let ledger = service.ingest(&import)?;
    println!(
        "Ledger {}: {} rows across {} vendors",
        csv.display(),
        import.entries().len(),
        ledger.received
    );
    for failure in ledger.failures.iter().filter(|failure| failure.field == "gstin") {
        println!("  - skipped vendor #{}: {}", failure.index + 1, failure.reason);
    }

    let gstins: Vec<Gstin> = service
        .list()?
        .iter()
        .filter_map(VendorRecord::key)
        .collect();
    let registry = synthetic_registry(registry_seed, today);
    let checks = service.ingest(&registry.lookup(&gstins))?;
    render_ingest("Registry checks", &checks);

    let mut records = service.list()?;
    records.sort_by(|left, right| right.risk_score().cmp(&left.risk_score()));
    render_risk_table(&records);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        vendors,
        seed,
        today,
    } = args;

    println!("Transaction Bloodhound demo");
    let registry = synthetic_registry(seed, today)
        .with_generated_portfolio(vendors)
        .with_ledger();
    println!(
        "Synthetic portfolio of {} vendors evaluated {}",
        registry.portfolio().len(),
        registry.today()
    );

    let service = VendorService::new(
        Arc::new(InMemoryVendorRepository::default()),
        ScoringConfig::default(),
    );
    let report = service.ingest(&registry)?;
    render_ingest("Registry ingest", &report);

    let summary = service.portfolio()?;
    render_portfolio(&summary);

    Ok(())
}

fn synthetic_registry(seed: Option<u64>, today: Option<NaiveDate>) -> SyntheticRegistry {
    let registry = match seed {
        Some(seed) => SyntheticRegistry::seeded(seed),
        None => SyntheticRegistry::new(),
    };
    match today {
        Some(today) => registry.with_today(today),
        None => registry,
    }
}

fn render_ingest(label: &str, report: &IngestReport) {
    println!(
        "{label}: {} received | {} created | {} updated | {} scored",
        report.received, report.created, report.updated, report.scored
    );
    for failure in &report.failures {
        let gstin = failure.gstin.as_deref().unwrap_or("<no GSTIN>");
        println!("  - {gstin}: {}", failure.reason);
    }
}

fn render_risk_table(records: &[VendorRecord]) {
    println!("\n{:<17} {:<28} {:>5}  {:<12} Top factor", "GSTIN", "Vendor", "Score", "Tier");
    for record in records {
        let view = record.status_view();
        let score = view
            .risk_score
            .map(|score| score.to_string())
            .unwrap_or_else(|| "-".to_string());
        let level = view.risk_level.unwrap_or("Unscored");
        let top_factor = view.risk_factors.first().map(String::as_str).unwrap_or("-");
        println!(
            "{:<17} {:<28} {:>5}  {:<12} {}",
            view.gstin,
            truncate(view.name.as_deref().unwrap_or("-"), 28),
            score,
            level,
            top_factor
        );
    }

    let flagged: Vec<&VendorRecord> = records
        .iter()
        .filter(|record| record.risk_level() >= Some(RiskLevel::High))
        .collect();
    if flagged.is_empty() {
        return;
    }

    println!("\nAction required");
    for record in flagged {
        let view = record.status_view();
        println!("- {} ({})", view.gstin, view.risk_level.unwrap_or("Unscored"));
        for breach in &view.breaches {
            println!("    breach: {breach}");
        }
        for action in &view.recommended_actions {
            println!("    action: {action}");
        }
    }
}

fn render_portfolio(summary: &PortfolioSummary) {
    println!("\nPortfolio dashboard");
    println!(
        "- {} vendors | {} unscored | {} with compliance breaches",
        summary.total_vendors, summary.unscored, summary.vendors_with_breaches
    );
    println!("- {}", tier_breakdown(summary));
    println!("- ITC at risk: INR {}", format_amount(summary.itc_at_risk));

    if summary.top_risks.is_empty() {
        return;
    }
    println!("Top risks:");
    for view in &summary.top_risks {
        println!(
            "  - {} {} | score {} ({})",
            view.gstin,
            view.name.as_deref().unwrap_or("-"),
            view.risk_score.unwrap_or_default(),
            view.risk_level.unwrap_or("Unscored")
        );
        for factor in &view.risk_factors {
            println!("      factor: {factor}");
        }
        if let Some(action) = view.recommended_actions.first() {
            println!("      next step: {action}");
        }
    }
}

/// Tier counts, most severe first.
fn tier_breakdown(summary: &PortfolioSummary) -> String {
    RiskLevel::ALL
        .iter()
        .rev()
        .map(|level| format!("{} {}", level.label(), summary.tiers.get(*level)))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn format_amount(amount: Decimal) -> String {
    amount.round_dp(2).to_string()
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(width.saturating_sub(1)).collect();
    shortened.push('~');
    shortened
}
