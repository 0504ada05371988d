use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use piv_billing::billing::{
    build_ledger, calculate_monthly_billing, BillingPeriod, MonthlyStatement, PanelSnapshot,
};
use piv_billing::config::{
    config_dir, load_config, load_roster, Config, EventKind, CONFIG_TEMPLATE, EVENTS_TEMPLATE,
    PANELS_TEMPLATE,
};
use piv_billing::error::{BillingError, Result};
use piv_billing::status::recompute_status;

#[derive(Parser)]
#[command(name = "piv")]
#[command(version, about = "PIV panel lifecycle and monthly billing", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.piv or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// List panels with their current status
    Panels,

    /// Show the monthly billing statement for all panels
    Billing {
        /// Year to bill (e.g., 2024)
        #[arg(short, long)]
        year: i32,

        /// Month to bill (1-12)
        #[arg(short, long)]
        month: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the day-by-day billing ledger of one panel
    Ledger {
        /// Panel identifier from panels.toml
        panel: String,

        /// Year to bill (e.g., 2024)
        #[arg(short, long)]
        year: i32,

        /// Month to bill (1-12)
        #[arg(short, long)]
        month: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show config location and roster size
    Status,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Panels => cmd_panels(&cfg_dir),
        Commands::Billing { year, month, json } => cmd_billing(&cfg_dir, year, month, json),
        Commands::Ledger {
            panel,
            year,
            month,
            json,
        } => cmd_ledger(&cfg_dir, &panel, year, month, json),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

fn ensure_initialized(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(BillingError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("panels.toml"), PANELS_TEMPLATE)?;
    fs::write(cfg_dir.join("events.toml"), EVENTS_TEMPLATE)?;
    tracing::info!(path = %cfg_dir.display(), "config directory initialized");

    println!("Initialized PIV billing config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your operator details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your panels:             $EDITOR {}/panels.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Log lifecycle events:        $EDITOR {}/events.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then bill a month:");
    println!("  piv billing --year <year> --month <month>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct PanelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "SINCE")]
    since: String,
    #[tabled(rename = "INSTALLED")]
    installed: String,
    #[tabled(rename = "REMOVED")]
    removed: String,
    #[tabled(rename = "REINSTALLED")]
    reinstalled: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "CLIENT")]
    client: String,
}

#[derive(Tabled)]
struct StatementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DAYS")]
    days: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "BILLABLE")]
    billable: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "NOTE")]
    note: String,
}

fn format_money(value: Decimal, currency_symbol: &str) -> String {
    format!("{}{:.2}", currency_symbol, value)
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Turn the last row of a statement table into a TOTAL footer.
///
/// The table must be rendered with the totals as its last row so the
/// DAYS and AMOUNT columns are already wide enough for them.
fn add_total_footer(table: &str, days: &str, amount: &str) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 5 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let Some(inner) = lines[0].strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() != 5 {
        return table.to_string();
    }

    // ID, CLIENT and STATUS merge into one label cell
    let left_width = widths[0] + widths[1] + widths[2] + 2;
    let days_width = widths[3];
    let amount_width = widths[4];

    // drop the totals row and the bottom border
    let mut out = lines[..lines.len() - 2].join("\n");
    out.push('\n');
    out.push_str(&format!(
        "├{}┴{}┴{}┼{}┼{}┤\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(days_width),
        "─".repeat(amount_width),
    ));
    out.push_str(&format!(
        "│ {:>left$} │ {:>days$} │ {:>amount$} │\n",
        "TOTAL",
        days,
        amount,
        left = left_width - 2,
        days = days_width - 2,
        amount = amount_width - 2,
    ));
    out.push_str(&format!(
        "╰{}┴{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(days_width),
        "─".repeat(amount_width)
    ));

    out
}

/// List panels with recomputed status
fn cmd_panels(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let roster = load_roster(cfg_dir)?;

    if roster.panels.is_empty() {
        println!("No panels configured.");
        println!("Add panels to: {}/panels.toml", cfg_dir.display());
        return Ok(());
    }

    let today = today();
    let rows: Vec<PanelRow> = roster
        .panels
        .iter()
        .map(|(id, panel)| {
            let update = recompute_status(id, panel, roster.events_for(id), today);
            PanelRow {
                id: id.clone(),
                status: update.status.to_string(),
                since: update.last_status_update.to_string(),
                installed: or_dash(panel.install_date.as_deref()),
                removed: or_dash(panel.deinstall_date.as_deref()),
                reinstalled: or_dash(panel.reinstall_date.as_deref()),
                rate: format_money(
                    PanelSnapshot::from(panel).effective_rate(),
                    &config.billing.currency_symbol,
                ),
                client: or_dash(panel.client.as_deref()),
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} panels", roster.panels.len());

    Ok(())
}

/// Show the monthly statement for the whole roster
fn cmd_billing(cfg_dir: &Path, year: i32, month: u32, json: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let period = BillingPeriod::new(year, month)?;
    let config = load_config(cfg_dir)?;
    let roster = load_roster(cfg_dir)?;
    let statement = MonthlyStatement::build(&roster, period, today());

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }

    println!("Billing for {}", period);

    if statement.lines.is_empty() {
        println!("No billable panels for {}.", period);
        return Ok(());
    }

    let symbol = &config.billing.currency_symbol;
    let total_days = statement.total_billed_days.to_string();
    let total_amount = format_money(statement.total_amount, symbol);
    let mut rows: Vec<StatementRow> = statement
        .lines
        .iter()
        .map(|line| StatementRow {
            id: line.billing.panel_id.clone(),
            client: or_dash(
                line.billing
                    .panel
                    .as_ref()
                    .and_then(|p| p.client.as_deref()),
            ),
            status: line.status.to_string(),
            days: format!("{}/{}", line.billing.billed_days, line.billing.total_days_in_month),
            amount: format_money(line.billing.amount, symbol),
        })
        .collect();
    rows.push(StatementRow {
        id: String::new(),
        client: String::new(),
        status: "TOTAL".to_string(),
        days: total_days.clone(),
        amount: total_amount.clone(),
    });

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_total_footer(&table, &total_days, &total_amount);
    println!("{table}");

    Ok(())
}

/// Show the daily ledger and summary of one panel
fn cmd_ledger(cfg_dir: &Path, panel_id: &str, year: i32, month: u32, json: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let period = BillingPeriod::new(year, month)?;
    let config: Config = load_config(cfg_dir)?;
    let roster = load_roster(cfg_dir)?;

    let summary = calculate_monthly_billing(panel_id, period, &roster.panels);
    let Some(panel) = summary.panel.as_ref() else {
        return Err(BillingError::PanelNotFound(panel_id.to_string()));
    };
    let snapshot = PanelSnapshot::from(panel);
    let ledger = build_ledger(&snapshot, period, today());

    if json {
        let body = serde_json::json!({ "ledger": ledger, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let rows: Vec<DayRow> = ledger
        .iter()
        .map(|day| DayRow {
            date: day.date.to_string(),
            billable: if day.is_billable { "yes" } else { "no" }.to_string(),
            status: day.status.to_string(),
            note: day.note.clone(),
        })
        .collect();

    let symbol = &config.billing.currency_symbol;
    println!("Panel {} - {}", panel_id, period);
    println!("{}", Table::new(rows).with(Style::rounded()));
    println!(
        "Billed days: {}/{}",
        summary.billed_days, summary.total_days_in_month
    );
    println!(
        "Monthly rate: {}",
        format_money(snapshot.effective_rate(), symbol)
    );
    println!("Amount:       {}", format_money(summary.amount, symbol));

    Ok(())
}

/// Show config location and roster size
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let roster = load_roster(cfg_dir)?;
    let period = BillingPeriod::containing(today());
    let statement = MonthlyStatement::build(&roster, period, today());

    println!("PIV Billing Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    match &config.operator.email {
        Some(email) => println!("Operator:         {} <{}>", config.operator.name, email),
        None => println!("Operator:         {}", config.operator.name),
    }
    println!(
        "Currency:         {} ({})",
        config.billing.currency, config.billing.currency_symbol
    );
    println!("Panels:           {}", roster.panels.len());
    let removals = roster
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Deinstallation)
        .count();
    println!(
        "Events:           {} ({} {}, {} {})",
        roster.events.len(),
        removals,
        EventKind::Deinstallation,
        roster.events.len() - removals,
        EventKind::Reinstallation
    );
    println!(
        "{:<18}{} ({} panels)",
        format!("{}:", period),
        format_money(statement.total_amount, &config.billing.currency_symbol),
        statement.lines.len()
    );

    Ok(())
}
