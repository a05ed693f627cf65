//! Command-line arguments.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Cup ledger for tea vendors
#[derive(Parser, Debug)]
#[command(name = "chai-khata", version)]
#[command(about = "Track cups served on credit and settle up")]
pub struct Cli {
    /// Directory holding the ledger files
    #[arg(long, env = "CHAI_KHATA_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// PIN for a locked ledger
    #[arg(long, env = "CHAI_KHATA_PIN", global = true, hide_env_values = true)]
    pub pin: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Record cups taken on credit
    Sale {
        customer_id: String,
        /// Number of cups
        #[arg(short, long)]
        qty: Option<u32>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Settle everything a customer owes
    Settle { customer_id: String },
    /// Show every entry for a customer
    History { customer_id: String },
    /// Outstanding cups and money for every customer
    Summary,
    /// Export the ledger as CSV
    Export {
        /// Directory to write into (defaults to Documents, then home)
        #[arg(long)]
        out_dir: Option<String>,
        /// Print the CSV instead of writing a file
        #[arg(long, conflicts_with = "out_dir")]
        stdout: bool,
    },
    /// View or change preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// PIN attempt history
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CustomerAction {
    List,
    Add {
        name: String,
        /// Price per cup; the current default when omitted
        #[arg(long)]
        price: Option<f64>,
    },
    Show {
        id: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Delete a customer and their whole ledger
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        default_price: Option<f64>,
        /// Lock the ledger with a new 4 digit PIN
        #[arg(long)]
        new_pin: Option<String>,
        /// Remove the PIN
        #[arg(long, conflicts_with = "new_pin")]
        disable_pin: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PinAction {
    Attempts {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sale_with_global_flags() {
        let cli = Cli::try_parse_from([
            "chai-khata", "sale", "customer::1", "--qty", "3", "--pin", "1234", "--json", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.pin.as_deref(), Some("1234"));
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.command,
            Command::Sale {
                customer_id: "customer::1".to_string(),
                qty: Some(3),
                note: None,
            }
        );
    }

    #[test]
    fn test_disable_pin_conflicts_with_new_pin() {
        let result = Cli::try_parse_from([
            "chai-khata", "settings", "set", "--new-pin", "1234", "--disable-pin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_pin_attempts_default_limit() {
        let cli = Cli::try_parse_from(["chai-khata", "pin", "attempts"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Pin {
                action: PinAction::Attempts { limit: 20 }
            }
        );
    }
}
