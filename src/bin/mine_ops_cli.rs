use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use mine_ops::{
    common::{format_money, system_clock},
    config,
    filter::ListFilter,
    models::{AttendanceMark, Cart, Chemical, Invoice, LineItemDraft, Worker},
    services::{
        inventory::classify,
        reports::{Alert, ExportFormat, ReportExporter, SimulatedExporter, SummaryReport},
    },
    AppState,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    let mut state = AppState::bootstrap(app_config, system_clock())
        .context("failed to initialise application state")?;
    open_session(&mut state, &cli.username, &cli.password)?;

    match cli.command {
        Commands::Report(args) => handle_report(&state, args, cli.json)?,
        Commands::Alerts => handle_alerts(&state, cli.json)?,
        Commands::Carts(args) => handle_carts(&state, args, cli.json)?,
        Commands::Chemicals(args) => handle_chemicals(&state, args, cli.json)?,
        Commands::Workers(args) => handle_workers(&state, args, cli.json)?,
        Commands::Invoices(args) => handle_invoices(&state, args, cli.json)?,
        Commands::Attendance(args) => handle_attendance(&state, args, cli.json)?,
        Commands::Classify(args) => handle_classify(args, cli.json)?,
        Commands::Quote(args) => handle_quote(&state, args, cli.json)?,
        Commands::Export(args) => handle_export(&state, args, cli.json)?,
        Commands::Activity(args) => handle_activity(&state, args, cli.json)?,
    }

    state.session.logout();
    Ok(())
}

#[derive(Parser)]
#[command(name = "mine-ops", about = "Mining operations dashboard CLI", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(long, global = true, env = "APP_USERNAME", default_value = "", help = "Operator username")]
    username: String,
    #[arg(
        long,
        global = true,
        env = "APP_PASSWORD",
        default_value = "",
        hide_env_values = true,
        help = "Operator password"
    )]
    password: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary of fleet, inventory, sales and personnel
    Report(ReportArgs),
    /// Current dashboard alerts
    Alerts,
    /// List haul carts
    Carts(ListArgs),
    /// List chemicals with their stock tier
    Chemicals(ListArgs),
    /// List workers
    Workers(ListArgs),
    /// List invoices
    Invoices(ListArgs),
    /// Attendance marks for one day
    Attendance(AttendanceArgs),
    /// Classify a stock level against its minimum
    Classify(ClassifyArgs),
    /// Compute invoice totals for a set of lines
    Quote(QuoteArgs),
    /// Export the summary report
    Export(ExportArgs),
    /// Recent activity feed
    Activity(ActivityArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, default_value = "", help = "Case-insensitive text to search for")]
    search: String,
    #[arg(long, default_value = "", help = "Exact category or status to keep")]
    filter: String,
}

impl ListArgs {
    fn to_filter(&self) -> ListFilter {
        ListFilter::new(self.search.clone(), self.filter.clone())
    }
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long, value_parser = parse_date, help = "Report date (YYYY-MM-DD), defaults to today")]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct AttendanceArgs {
    #[arg(long, value_parser = parse_date, help = "Attendance date (YYYY-MM-DD), defaults to today")]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct ClassifyArgs {
    #[arg(long, value_parser = parse_decimal, help = "Current stock")]
    stock: Decimal,
    #[arg(long, value_parser = parse_decimal, help = "Minimum stock")]
    minimum: Decimal,
}

#[derive(Args)]
struct QuoteArgs {
    #[arg(
        long = "item",
        value_parser = parse_line_item,
        action = ArgAction::Append,
        required = true,
        help = "Invoice line as quantity:unit_price[:description] (e.g. 2:100.50:Flete)"
    )]
    items: Vec<LineItemDraft>,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long, value_parser = parse_export_format, help = "Export format: pdf or excel")]
    format: ExportFormat,
    #[arg(long, value_parser = parse_date, help = "Report date (YYYY-MM-DD), defaults to today")]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct ActivityArgs {
    #[arg(long, default_value_t = 10, help = "Number of entries to show")]
    limit: usize,
}

fn open_session(state: &mut AppState, username: &str, password: &str) -> Result<()> {
    state
        .session
        .login(username, password)
        .with_context(|| format!("login failed for user '{username}'"))?;
    debug!(%username, "session opened");
    Ok(())
}

fn report_for(state: &AppState, date: Option<NaiveDate>) -> Result<SummaryReport> {
    let report = match date {
        Some(date) => state.summary_report(date),
        None => state.todays_report(),
    };
    report.context("failed to build summary report")
}

fn handle_report(state: &AppState, args: ReportArgs, json: bool) -> Result<()> {
    let report = report_for(state, args.date)?;

    if json {
        return print_json(&report);
    }
    render_report(&report, &state.config.currency_symbol);
    Ok(())
}

fn handle_alerts(state: &AppState, json: bool) -> Result<()> {
    let alerts = state.alerts().context("failed to build alerts")?;
    if json {
        return print_json(&alerts);
    }
    if alerts.is_empty() {
        println!("No alerts.");
    }
    for alert in &alerts {
        render_alert(alert);
    }
    Ok(())
}

fn handle_carts(state: &AppState, args: ListArgs, json: bool) -> Result<()> {
    let carts = state.carts.search(&args.to_filter());
    if json {
        return print_json(&carts);
    }
    println!("{} cart(s)", carts.len());
    for cart in carts {
        render_cart(cart);
    }
    Ok(())
}

#[derive(Serialize)]
struct ChemicalRow<'a> {
    #[serde(flatten)]
    chemical: &'a Chemical,
    stock_status: String,
}

fn handle_chemicals(state: &AppState, args: ListArgs, json: bool) -> Result<()> {
    let chemicals = state.inventory.search(&args.to_filter());
    if json {
        let rows: Vec<ChemicalRow<'_>> = chemicals
            .into_iter()
            .map(|chemical| ChemicalRow {
                stock_status: chemical.stock_status().to_string(),
                chemical,
            })
            .collect();
        return print_json(&rows);
    }
    println!("{} chemical(s)", chemicals.len());
    for chemical in chemicals {
        render_chemical(chemical, &state.config.currency_symbol);
    }
    Ok(())
}

fn handle_workers(state: &AppState, args: ListArgs, json: bool) -> Result<()> {
    let workers = state.workforce.search_workers(&args.to_filter());
    if json {
        return print_json(&workers);
    }
    println!("{} worker(s)", workers.len());
    for worker in workers {
        render_worker(worker);
    }
    Ok(())
}

fn handle_invoices(state: &AppState, args: ListArgs, json: bool) -> Result<()> {
    let invoices = state.invoicing.search(&args.to_filter());
    if json {
        return print_json(&invoices);
    }
    println!("{} invoice(s)", invoices.len());
    for invoice in invoices {
        render_invoice(invoice, &state.config.currency_symbol);
    }
    Ok(())
}

fn handle_attendance(state: &AppState, args: AttendanceArgs, json: bool) -> Result<()> {
    let date = args.date.unwrap_or_else(|| state.clock.today());
    let marks = state.workforce.marks_for_date(date);
    let summary = state.workforce.daily_summary(date);

    if json {
        #[derive(Serialize)]
        struct AttendanceView<'a> {
            marks: Vec<&'a AttendanceMark>,
            summary: mine_ops::services::workforce::AttendanceSummary,
        }
        return print_json(&AttendanceView { marks, summary });
    }

    println!("Attendance for {}", date);
    for mark in marks {
        let name = state
            .workforce
            .worker(&mark.worker_id)
            .map(|worker| worker.name.as_str())
            .unwrap_or(mark.worker_id.as_str());
        render_mark(mark, name);
    }
    println!(
        "present {} • late {} • absent {} • excused {} • unmarked {}",
        summary.present, summary.late, summary.absent, summary.excused, summary.unmarked
    );
    Ok(())
}

fn handle_classify(args: ClassifyArgs, json: bool) -> Result<()> {
    if args.stock.is_sign_negative() || args.minimum.is_sign_negative() {
        return Err(anyhow!("stock and minimum must not be negative"));
    }
    let status = classify(args.stock, args.minimum);
    if json {
        return print_json(&status);
    }
    println!("{}", status);
    Ok(())
}

fn handle_quote(state: &AppState, args: QuoteArgs, json: bool) -> Result<()> {
    let totals = state
        .invoicing
        .quote(&args.items)
        .context("cannot quote invoice lines")?;
    if json {
        return print_json(&totals);
    }
    let symbol = &state.config.currency_symbol;
    println!("Subtotal: {}", format_money(symbol, totals.subtotal));
    println!("Tax:      {}", format_money(symbol, totals.tax));
    println!("Total:    {}", format_money(symbol, totals.total));
    Ok(())
}

fn handle_export(state: &AppState, args: ExportArgs, json: bool) -> Result<()> {
    let report = report_for(state, args.date)?;
    let receipt = SimulatedExporter::new(state.clock.clone())
        .export(&report, args.format)
        .with_context(|| format!("{} export failed", args.format.label()))?;
    if json {
        return print_json(&receipt);
    }
    println!("{}", receipt.message);
    Ok(())
}

fn handle_activity(state: &AppState, args: ActivityArgs, json: bool) -> Result<()> {
    let entries = state.recent_activity(args.limit);
    if json {
        return print_json(&entries);
    }
    for entry in entries {
        println!("- [{}] {}", entry.at.format("%Y-%m-%d %H:%M"), entry.summary());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_report(report: &SummaryReport, symbol: &str) {
    println!("Summary report for {}", report.date);
    println!(
        "Fleet:     {}/{} carts active ({}% operational), {} in maintenance, {} out of service",
        report.fleet.active,
        report.fleet.total,
        report.fleet.operational_percent,
        report.fleet.maintenance,
        report.fleet.out_of_service
    );
    println!(
        "Inventory: {} items, {} low stock, value {}",
        report.inventory.total_items,
        report.inventory.low_stock_items,
        format_money(symbol, report.inventory.inventory_value)
    );
    println!(
        "Sales:     {} invoiced, {} collected ({} paid), {} outstanding ({} pending)",
        format_money(symbol, report.sales.total_invoiced),
        format_money(symbol, report.sales.collected),
        report.sales.paid_invoices,
        format_money(symbol, report.sales.outstanding),
        report.sales.pending_invoices
    );
    println!(
        "Personnel: {}/{} active, {} present, {} late",
        report.personnel.active_workers,
        report.personnel.total_workers,
        report.personnel.present_today,
        report.personnel.late_today
    );
    if !report.personnel.absentees.is_empty() {
        println!("Absent:    {}", report.personnel.absentees.join(", "));
    }
}

fn render_alert(alert: &Alert) {
    println!("- [{}] {} • {}", alert.severity, alert.title, alert.detail);
}

fn render_cart(cart: &Cart) {
    println!(
        "- Cart {} • capacity {} • status {} • {} • id {}",
        cart.code, cart.capacity, cart.status, cart.location, cart.id
    );
}

fn render_chemical(chemical: &Chemical, symbol: &str) {
    println!(
        "- {} ({}) • {} {} (min {}) • {} • {} per {} • expires {}",
        chemical.name,
        chemical.code,
        chemical.stock,
        chemical.unit,
        chemical.minimum_stock,
        chemical.stock_status(),
        format_money(symbol, chemical.unit_price),
        chemical.unit,
        chemical.expiration_date
    );
}

fn render_worker(worker: &Worker) {
    println!(
        "- {} • {} • {} shift • {} • id {}",
        worker.name, worker.position, worker.shift, worker.status, worker.id
    );
}

fn render_mark(mark: &AttendanceMark, name: &str) {
    let exit = mark
        .exit_time
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
    println!(
        "- {} • {} • in {} out {}{}",
        name,
        mark.status,
        mark.entry_time.format("%H:%M"),
        exit,
        mark.notes
            .as_deref()
            .map(|notes| format!(" • {}", notes))
            .unwrap_or_default()
    );
}

fn render_invoice(invoice: &Invoice, symbol: &str) {
    println!(
        "- Invoice {} • {} • {} • status {} • total {}",
        invoice.number,
        invoice.client,
        invoice.date,
        invoice.status,
        format_money(symbol, invoice.total)
    );
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("invalid decimal '{raw}'"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn parse_export_format(raw: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_str(raw).map_err(|_| format!("unknown export format '{raw}', expected pdf or excel"))
}

fn parse_line_item(raw: &str) -> Result<LineItemDraft, String> {
    let mut parts = raw.splitn(3, ':');
    let quantity = parts
        .next()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .ok_or_else(|| format!("invalid line '{raw}', expected quantity:unit_price"))?;
    let unit_price = parts
        .next()
        .map(str::trim)
        .ok_or_else(|| format!("invalid line '{raw}', expected quantity:unit_price"))?;

    let quantity: u32 = quantity
        .parse()
        .map_err(|_| format!("invalid quantity '{quantity}'"))?;
    if quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }
    let unit_price = parse_decimal(unit_price)?;
    if unit_price.is_sign_negative() {
        return Err("unit price must not be negative".to_string());
    }
    let description = parts
        .next()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or("Line item");

    Ok(LineItemDraft::new(description, quantity, unit_price))
}
