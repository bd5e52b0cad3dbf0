//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// routinepicker - product picker with an AI routine assistant
#[derive(Parser)]
#[command(
    name = "rp",
    about = "Pick beauty products and get an AI-generated routine",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/routinepicker/logs/routinepicker.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, global = true, help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)")]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to the TUI)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Launch the interactive TUI
    Tui,

    /// List products, filtered by category and/or search text
    Products {
        /// Only products in this category
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Case-insensitive search over name, brand and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List the catalog's categories
    Categories,

    /// Select a product, or deselect it if already selected
    Toggle {
        /// Product id
        id: String,
    },

    /// Show the selected products
    Selected,

    /// Deselect every product
    Clear,

    /// Generate a routine for the selected products
    Routine,

    /// Ask the assistant a question
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show or change the display direction
    Direction {
        /// New direction (omit to show the current one)
        #[arg(value_enum)]
        mode: Option<DirectionArg>,
    },
}

/// Direction argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Ltr,
    Rtl,
    Toggle,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("routinepicker")
        .join("logs")
        .join("routinepicker.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["rp"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_products_filters() {
        let cli = Cli::try_parse_from(["rp", "products", "-C", "skincare", "--search", "serum"]).unwrap();
        match cli.command {
            Some(Command::Products { category, search }) => {
                assert_eq!(category.as_deref(), Some("skincare"));
                assert_eq!(search.as_deref(), Some("serum"));
            }
            _ => panic!("expected products command"),
        }
    }

    #[test]
    fn test_ask_joins_words_and_global_flags() {
        let cli = Cli::try_parse_from(["rp", "ask", "what", "is", "toner", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Command::Ask { text }) => assert_eq!(text.join(" "), "what is toner"),
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_ask_requires_text() {
        assert!(Cli::try_parse_from(["rp", "ask"]).is_err());
    }

    #[test]
    fn test_direction_values() {
        let cli = Cli::try_parse_from(["rp", "direction", "rtl"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Direction {
                mode: Some(DirectionArg::Rtl)
            })
        ));
        assert!(Cli::try_parse_from(["rp", "direction", "sideways"]).is_err());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("routinepicker/logs/routinepicker.log"));
    }
}
