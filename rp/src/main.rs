//! routinepicker - product picker with an AI routine assistant
//!
//! CLI entry point: the TUI by default, plus scripted commands over the
//! same catalog, selection and chat components.

use std::fs;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, bail};
use tracing::{debug, info};

use routinepicker::assistant::Assistant;
use routinepicker::catalog::{ProductFilter, ProductId};
use routinepicker::chat::{ChatError, EntryKind};
use routinepicker::cli::{Cli, Command, DirectionArg, get_log_path};
use routinepicker::config::Config;
use routinepicker::preference::DisplayDirection;
use routinepicker::tui;
use routinepicker::view::{SELECTED_PLACEHOLDER, render_selected};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // Write to a log file; the terminal belongs to the TUI
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!(?config, "main: config loaded");

    let mut assistant = Assistant::bootstrap(&config).await?;
    report_notices(&assistant);

    match cli.command {
        None | Some(Command::Tui) => tui::run(assistant).await,
        Some(Command::Products { category, search }) => cmd_products(&assistant, category, search),
        Some(Command::Categories) => cmd_categories(&assistant),
        Some(Command::Toggle { id }) => cmd_toggle(&mut assistant, &id),
        Some(Command::Selected) => cmd_selected(&assistant),
        Some(Command::Clear) => cmd_clear(&mut assistant),
        Some(Command::Routine) => cmd_routine(&mut assistant).await,
        Some(Command::Ask { text }) => cmd_ask(&mut assistant, &text.join(" ")).await,
        Some(Command::Direction { mode }) => cmd_direction(&mut assistant, mode),
    }
}

/// Print startup notices (catalog failures) for scripted commands
fn report_notices(assistant: &Assistant) {
    for entry in assistant.chat().entries() {
        if entry.kind == EntryKind::Notice {
            eprintln!("{}", entry.text().yellow());
        }
    }
}

fn cmd_products(assistant: &Assistant, category: Option<String>, search: Option<String>) -> Result<()> {
    let filter = ProductFilter::new(category, search.unwrap_or_default());
    let products = filter.apply(assistant.catalog());

    if products.is_empty() {
        println!("{}", "No products match.".dimmed());
        return Ok(());
    }

    for product in products {
        let marker = if assistant.selection().contains(&product.id) {
            "✓".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {}  {} {}  {}",
            marker,
            format!("{:>4}", product.id).cyan(),
            product.name.bold(),
            format!("({})", product.brand).dimmed(),
            format!("[{}]", product.category).yellow()
        );
    }
    Ok(())
}

fn cmd_categories(assistant: &Assistant) -> Result<()> {
    for category in assistant.catalog().categories() {
        println!("{}", category);
    }
    Ok(())
}

fn cmd_toggle(assistant: &mut Assistant, raw_id: &str) -> Result<()> {
    let id = ProductId::new(raw_id);
    let Some(label) = assistant.catalog().get(&id).map(|p| p.label()) else {
        bail!("Unknown product id: {}", raw_id);
    };

    if assistant.toggle(&id) {
        println!("{} {}", "Selected:".green().bold(), label);
    } else {
        println!("{} {}", "Deselected:".yellow().bold(), label);
    }
    Ok(())
}

fn cmd_selected(assistant: &Assistant) -> Result<()> {
    let panel = render_selected(assistant.catalog(), assistant.selection());
    if panel.items.is_empty() {
        println!("{}", panel.placeholder.unwrap_or(SELECTED_PLACEHOLDER).dimmed());
        return Ok(());
    }

    for (i, item) in panel.items.iter().enumerate() {
        println!(
            "{:>2}. {} {}  {}",
            i + 1,
            item.name.bold(),
            format!("({})", item.brand).dimmed(),
            format!("id {}", item.id).dimmed()
        );
    }

    let stale = assistant.selection().len() - panel.items.len();
    if stale > 0 {
        println!("{}", format!("{} selected id(s) not in the current catalog", stale).dimmed());
    }
    Ok(())
}

fn cmd_clear(assistant: &mut Assistant) -> Result<()> {
    let count = assistant.selection().len();
    assistant.clear_selection();
    println!("Cleared {} selected product(s)", count);
    Ok(())
}

async fn cmd_routine(assistant: &mut Assistant) -> Result<()> {
    match assistant.generate_routine() {
        Ok(()) => print_reply(assistant).await,
        Err(e) => rejected(assistant, e),
    }
}

async fn cmd_ask(assistant: &mut Assistant, text: &str) -> Result<()> {
    match assistant.submit_chat(text) {
        Ok(()) => print_reply(assistant).await,
        Err(e) => rejected(assistant, e),
    }
}

/// Report a submission that produced no request
fn rejected(assistant: &Assistant, error: ChatError) -> Result<()> {
    if let Some(entry) = assistant.chat().entries().last()
        && entry.kind == EntryKind::Notice
    {
        eprintln!("{}", entry.text().yellow());
    }
    bail!("Nothing sent: {}", error)
}

/// Wait for the reply and print it, links and sources included
async fn print_reply(assistant: &mut Assistant) -> Result<()> {
    assistant.wait().await;

    let Some(entry) = assistant.chat().entries().last() else {
        bail!("No reply received");
    };
    if entry.kind == EntryKind::Notice {
        bail!("{}", entry.text());
    }

    println!("{}", entry.text());
    if !entry.citations.is_empty() {
        println!();
        println!("{}", "Sources:".dimmed());
        for url in &entry.citations {
            println!("  {}", url.blue().underline());
        }
    }
    Ok(())
}

fn cmd_direction(assistant: &mut Assistant, mode: Option<DirectionArg>) -> Result<()> {
    let direction = match mode {
        None => assistant.direction(),
        Some(DirectionArg::Toggle) => assistant.toggle_direction(),
        Some(DirectionArg::Ltr) => {
            assistant.set_direction(DisplayDirection::Ltr);
            DisplayDirection::Ltr
        }
        Some(DirectionArg::Rtl) => {
            assistant.set_direction(DisplayDirection::Rtl);
            DisplayDirection::Rtl
        }
    };
    println!("{}", direction);
    Ok(())
}
