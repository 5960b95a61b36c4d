//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - list/show: query orders
//! - create/update/delete: edit orders
//! - status/priority: quick single-field updates
//! - import: bulk insert from a JSON file
//! - history: query the audit trail

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lineboard::domain::{OrderPriority, OrderStatus};

/// Lineboard - a rotating production order board for shop-floor TVs
#[derive(Parser, Debug)]
#[command(name = "lineboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute; none launches the TV display
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List orders, weighted-sorted the way the board shows them
    List {
        /// Filter by status (scheduled, production, quality, hold)
        #[arg(short, long)]
        status: Option<OrderStatus>,

        /// Filter by priority (low, normal, high, critical)
        #[arg(short, long)]
        priority: Option<OrderPriority>,

        /// Filter by company name
        #[arg(long)]
        company: Option<String>,
    },

    /// Show one order
    Show {
        /// Order ID
        id: String,
    },

    /// Create a new order
    Create {
        /// Part name shown on the board
        part_name: String,

        /// Total quantity to produce
        #[arg(short, long)]
        quantity: u32,

        /// Company the order belongs to
        #[arg(long)]
        company: Option<String>,

        /// Priority (low, normal, high, critical)
        #[arg(short, long, default_value = "normal")]
        priority: OrderPriority,
    },

    /// Update fields of an existing order
    Update {
        /// Order ID
        id: String,

        /// New part name
        #[arg(long)]
        part_name: Option<String>,

        /// New total quantity
        #[arg(long)]
        quantity: Option<u32>,

        /// New completed quantity
        #[arg(long)]
        completed: Option<u32>,

        /// New company
        #[arg(long)]
        company: Option<String>,
    },

    /// Delete an order
    Delete {
        /// Order ID
        id: String,
    },

    /// Change an order's production status
    Status {
        /// Order ID
        id: String,

        /// New status (scheduled, production, quality, hold)
        status: OrderStatus,
    },

    /// Change an order's priority
    Priority {
        /// Order ID
        id: String,

        /// New priority (low, normal, high, critical)
        priority: OrderPriority,
    },

    /// Bulk-insert orders from a JSON file
    Import {
        /// Path to a JSON array of order drafts
        file: PathBuf,
    },

    /// Query the order audit history
    History {
        /// Only changes at or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only changes before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only changes touching this field
        #[arg(long)]
        field: Option<String>,

        /// Only this change type (create, update, delete)
        #[arg(long)]
        change_type: Option<String>,

        /// Only changes to this order
        #[arg(long)]
        order_id: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        // No args should result in None command (TV display mode)
        let cli = Cli::try_parse_from(["lineboard"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["lineboard", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["lineboard", "-c", "/path/to/lineboard.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/lineboard.yml")));
    }

    #[test]
    fn test_list_command() {
        let cli = Cli::try_parse_from(["lineboard", "list"]).unwrap();
        match cli.command {
            Some(Commands::List { status, priority, company }) => {
                assert!(status.is_none());
                assert!(priority.is_none());
                assert!(company.is_none());
            }
            _ => panic!("Expected list command"),
        }
    }

    #[test]
    fn test_list_with_filters() {
        let cli = Cli::try_parse_from(["lineboard", "list", "-s", "hold", "-p", "critical"]).unwrap();
        match cli.command {
            Some(Commands::List { status, priority, .. }) => {
                assert_eq!(status, Some(OrderStatus::Hold));
                assert_eq!(priority, Some(OrderPriority::Critical));
            }
            _ => panic!("Expected list command"),
        }
    }

    #[test]
    fn test_show_command() {
        let cli = Cli::try_parse_from(["lineboard", "show", "42"]).unwrap();
        match cli.command {
            Some(Commands::Show { id }) => assert_eq!(id, "42"),
            _ => panic!("Expected show command"),
        }
    }

    #[test]
    fn test_create_command() {
        let cli = Cli::try_parse_from([
            "lineboard", "create", "Bracket", "-q", "500", "--company", "Acme", "-p", "high",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Create { part_name, quantity, company, priority }) => {
                assert_eq!(part_name, "Bracket");
                assert_eq!(quantity, 500);
                assert_eq!(company.as_deref(), Some("Acme"));
                assert_eq!(priority, OrderPriority::High);
            }
            _ => panic!("Expected create command"),
        }
    }

    #[test]
    fn test_create_defaults_to_normal_priority() {
        let cli = Cli::try_parse_from(["lineboard", "create", "Bracket", "-q", "10"]).unwrap();
        match cli.command {
            Some(Commands::Create { priority, .. }) => {
                assert_eq!(priority, OrderPriority::Normal);
            }
            _ => panic!("Expected create command"),
        }
    }

    #[test]
    fn test_update_command() {
        let cli = Cli::try_parse_from(["lineboard", "update", "42", "--completed", "75"]).unwrap();
        match cli.command {
            Some(Commands::Update { id, completed, part_name, .. }) => {
                assert_eq!(id, "42");
                assert_eq!(completed, Some(75));
                assert!(part_name.is_none());
            }
            _ => panic!("Expected update command"),
        }
    }

    #[test]
    fn test_status_command() {
        let cli = Cli::try_parse_from(["lineboard", "status", "42", "production"]).unwrap();
        match cli.command {
            Some(Commands::Status { id, status }) => {
                assert_eq!(id, "42");
                assert_eq!(status, OrderStatus::Production);
            }
            _ => panic!("Expected status command"),
        }
    }

    #[test]
    fn test_priority_command() {
        let cli = Cli::try_parse_from(["lineboard", "priority", "42", "critical"]).unwrap();
        match cli.command {
            Some(Commands::Priority { id, priority }) => {
                assert_eq!(id, "42");
                assert_eq!(priority, OrderPriority::Critical);
            }
            _ => panic!("Expected priority command"),
        }
    }

    #[test]
    fn test_import_command() {
        let cli = Cli::try_parse_from(["lineboard", "import", "orders.json"]).unwrap();
        match cli.command {
            Some(Commands::Import { file }) => {
                assert_eq!(file, PathBuf::from("orders.json"));
            }
            _ => panic!("Expected import command"),
        }
    }

    #[test]
    fn test_history_command() {
        let cli = Cli::try_parse_from([
            "lineboard", "history", "--from", "2025-06-01", "--change-type", "delete",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::History { from, change_type, to, .. }) => {
                assert_eq!(from.as_deref(), Some("2025-06-01"));
                assert_eq!(change_type.as_deref(), Some("delete"));
                assert!(to.is_none());
            }
            _ => panic!("Expected history command"),
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["lineboard", "status", "42", "bogus"]).is_err());
    }

    #[test]
    fn test_help_works() {
        // Verify help doesn't panic
        Cli::command().debug_assert();
    }
}
