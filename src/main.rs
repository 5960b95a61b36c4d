use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use lineboard::api::{ApiClient, HistoryFilter, HistoryStore, OrderStore, RestHistoryStore, RestOrderStore};
use lineboard::domain::{Order, OrderDraft, OrderPatch, OrderPriority, OrderStatus};
use lineboard::rank::weighted_sort;
use lineboard::tui;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lineboard")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("lineboard.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => {
            // Default: launch the TV display
            run_display(config).await
        }
        Some(Commands::List { status, priority, company }) => {
            handle_list_command(*status, *priority, company.as_deref(), config).await
        }
        Some(Commands::Show { id }) => handle_show_command(id, config).await,
        Some(Commands::Create { part_name, quantity, company, priority }) => {
            handle_create_command(part_name, *quantity, company.clone(), *priority, config).await
        }
        Some(Commands::Update { id, part_name, quantity, completed, company }) => {
            handle_update_command(id, part_name.clone(), *quantity, *completed, company.clone(), config).await
        }
        Some(Commands::Delete { id }) => handle_delete_command(id, config).await,
        Some(Commands::Status { id, status }) => handle_status_command(id, *status, config).await,
        Some(Commands::Priority { id, priority }) => handle_priority_command(id, *priority, config).await,
        Some(Commands::Import { file }) => handle_import_command(file, config).await,
        Some(Commands::History { from, to, field, change_type, order_id }) => {
            handle_history_command(
                from.as_deref(),
                to.as_deref(),
                field.clone(),
                change_type.as_deref(),
                order_id.clone(),
                config,
            )
            .await
        }
    }
}

/// Config-file backend overrides win; otherwise the memoized
/// environment-configured client is reused.
fn api_client(config: &Config) -> Result<Arc<ApiClient>> {
    if config.backend.url.is_some() || config.backend.anon_key.is_some() {
        return Ok(Arc::new(ApiClient::new(config.backend_config()?)));
    }
    Ok(Arc::new(ApiClient::shared()?.clone()))
}

fn order_store(config: &Config) -> Result<Arc<dyn OrderStore>> {
    Ok(Arc::new(RestOrderStore::new(api_client(config)?)))
}

async fn run_display(config: &Config) -> Result<()> {
    info!("Launching TV display");
    let client = api_client(config)?;
    let store: Arc<dyn OrderStore> = Arc::new(RestOrderStore::new(client.clone()));

    let session = tui::DashboardSession::start(store, Some(client), config.dashboard_config()).await;
    tui::app::run(session).await?;
    Ok(())
}

async fn handle_list_command(
    status: Option<OrderStatus>,
    priority: Option<OrderPriority>,
    company: Option<&str>,
    config: &Config,
) -> Result<()> {
    info!("Listing orders - status: {:?}, priority: {:?}", status, priority);
    let store = order_store(config)?;
    let mut orders = store.fetch_all().await?;

    orders.retain(|order| {
        status.is_none_or(|s| order.status == s)
            && priority.is_none_or(|p| order.priority == p)
            && company.is_none_or(|c| order.company() == c)
    });

    let sorted = weighted_sort(&orders, config.sort_options());
    if sorted.is_empty() {
        println!("{}", "No matching orders".yellow());
        return Ok(());
    }
    for order in &sorted {
        print_order_line(order);
    }
    Ok(())
}

async fn handle_show_command(id: &str, config: &Config) -> Result<()> {
    info!("Showing order: {}", id);
    let store = order_store(config)?;
    let order = store.fetch_by_id(id).await?;

    println!("{} {}", "Order".green().bold(), order.id);
    println!("  Part:      {}", order.part_name);
    println!("  Company:   {}", order.company());
    println!("  Status:    {}", order.status.to_string().cyan());
    println!("  Priority:  {}", colored_priority(order.priority));
    println!(
        "  Progress:  {}/{} ({}%)",
        order.quantity_completed,
        order.quantity_total,
        order.progress_pct()
    );
    println!("  Created:   {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    Ok(())
}

async fn handle_create_command(
    part_name: &str,
    quantity: u32,
    company: Option<String>,
    priority: OrderPriority,
    config: &Config,
) -> Result<()> {
    info!("Creating order: {}", part_name);
    let store = order_store(config)?;
    let draft = OrderDraft {
        company_name: company,
        part_name: part_name.to_string(),
        quantity_total: quantity,
        quantity_completed: 0,
        priority,
        status: OrderStatus::Scheduled,
    };
    let order = store.create(&draft).await?;
    println!("{} {}", "Created:".green(), order.id);
    Ok(())
}

async fn handle_update_command(
    id: &str,
    part_name: Option<String>,
    quantity: Option<u32>,
    completed: Option<u32>,
    company: Option<String>,
    config: &Config,
) -> Result<()> {
    info!("Updating order: {}", id);
    let patch = OrderPatch {
        company_name: company,
        part_name,
        quantity_total: quantity,
        quantity_completed: completed,
        priority: None,
        status: None,
    };
    if patch.is_empty() {
        println!("{}", "Nothing to update".yellow());
        return Ok(());
    }
    let store = order_store(config)?;
    let order = store.update(id, &patch).await?;
    println!("{} {}", "Updated:".green(), order.id);
    Ok(())
}

async fn handle_delete_command(id: &str, config: &Config) -> Result<()> {
    info!("Deleting order: {}", id);
    let store = order_store(config)?;
    store.delete(id).await?;
    println!("{} {}", "Deleted:".red(), id);
    Ok(())
}

async fn handle_status_command(id: &str, status: OrderStatus, config: &Config) -> Result<()> {
    info!("Setting order {} status to {}", id, status);
    let store = order_store(config)?;
    let order = store.update_status(id, status).await?;
    println!("{} {} -> {}", "Status:".green(), order.id, order.status.to_string().cyan());
    Ok(())
}

async fn handle_priority_command(id: &str, priority: OrderPriority, config: &Config) -> Result<()> {
    info!("Setting order {} priority to {}", id, priority);
    let store = order_store(config)?;
    let order = store.update_priority(id, priority).await?;
    println!("{} {} -> {}", "Priority:".green(), order.id, colored_priority(order.priority));
    Ok(())
}

async fn handle_import_command(file: &Path, config: &Config) -> Result<()> {
    info!("Importing orders from {}", file.display());
    let content = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let drafts: Vec<OrderDraft> = serde_json::from_str(&content)
        .map_err(|e| lineboard::LineboardError::Import(format!("{}: {}", file.display(), e)))?;

    if drafts.is_empty() {
        println!("{}", "No rows to import".yellow());
        return Ok(());
    }

    let store = order_store(config)?;
    let report = store.insert_bulk(&drafts).await?;

    if report.is_complete() {
        println!("{} {} orders", "Imported:".green(), report.inserted);
    } else {
        println!(
            "{} {} of {} orders inserted",
            "Partial import:".yellow(),
            report.inserted,
            drafts.len()
        );
        for error in &report.errors {
            println!("  {}", error.red());
        }
    }
    Ok(())
}

async fn handle_history_command(
    from: Option<&str>,
    to: Option<&str>,
    field: Option<String>,
    change_type: Option<&str>,
    order_id: Option<String>,
    config: &Config,
) -> Result<()> {
    info!("Querying history - from: {:?}, to: {:?}", from, to);
    let filter = HistoryFilter {
        from: from.map(parse_day).transpose()?,
        to: to.map(parse_day).transpose()?,
        field,
        change_type: change_type
            .map(|raw| raw.parse().map_err(|e: String| eyre::eyre!(e)))
            .transpose()?,
        order_id,
    };

    let store = RestHistoryStore::new(api_client(config)?);
    let changes = store.fetch(&filter).await?;

    if changes.is_empty() {
        println!("{}", "No matching changes".yellow());
        return Ok(());
    }
    for change in &changes {
        println!(
            "{} {} {} {}: {} -> {}",
            change.changed_at.format("%Y-%m-%d %H:%M"),
            change.change_type.to_string().cyan(),
            change.order_id,
            change.changed_field,
            change.old_value.as_deref().unwrap_or("-"),
            change.new_value.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Parse `YYYY-MM-DD` as midnight UTC.
fn parse_day(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").context(format!("Invalid date '{}'", raw))?;
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

fn print_order_line(order: &Order) {
    println!(
        "{:<10} {:<24} {:<20} {:<10} {} {:>3}%",
        order.id,
        order.part_name,
        order.company(),
        order.status,
        colored_priority(order.priority),
        order.progress_pct(),
    );
}

fn colored_priority(priority: OrderPriority) -> ColoredString {
    match priority {
        OrderPriority::Critical => priority.to_string().red().bold(),
        OrderPriority::High => priority.to_string().yellow(),
        OrderPriority::Normal => priority.to_string().normal(),
        OrderPriority::Low => priority.to_string().dimmed(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
