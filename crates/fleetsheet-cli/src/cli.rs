//! CLI definition using clap

use clap::{Parser, Subcommand};
use fleetsheet_types::{Column, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleetsheet")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Reconcile a vehicle inventory against the fleet API and render it to Excel")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline in-process and write the spreadsheet
    Run {
        /// Client CSV (semicolon separated)
        csv: PathBuf,

        /// Columns to include after rnr (e.g. -k kurzname hu labelIds)
        #[arg(long, short = 'k', num_args = 1.., value_delimiter = ',')]
        keys: Vec<Column>,

        /// Fill rows by inspection age
        #[arg(long, short = 'c')]
        colored: bool,

        /// Output Excel file path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Start the upload server
    Serve {
        /// Listen address. Uses config value if not specified.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Upload the CSV to a running server and render the returned records
    Render {
        /// Client CSV (semicolon separated)
        csv: PathBuf,

        /// Server URL. Uses config value if not specified.
        #[arg(long)]
        server: Option<String>,

        /// Columns to include after rnr
        #[arg(long, short = 'k', num_args = 1.., value_delimiter = ',')]
        keys: Vec<Column>,

        /// Fill rows by inspection age
        #[arg(long, short = 'c')]
        colored: bool,

        /// Output Excel file path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Run the pipeline and print the records
    Show {
        /// Client CSV (semicolon separated)
        csv: PathBuf,

        /// Output format (json, table). Uses config value if not specified.
        #[arg(long, short = 'f')]
        format: Option<OutputFormat>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set fleet API base URL
        #[arg(long)]
        set_base_url: Option<String>,

        /// Set number of concurrent label lookups
        #[arg(long)]
        set_concurrency: Option<usize>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_keys_parse() {
        let cli = Cli::parse_from([
            "fleetsheet", "run", "vehicles.csv", "-k", "kurzname", "labelIds", "-c",
        ]);
        match cli.command {
            Commands::Run {
                csv, keys, colored, output,
            } => {
                assert_eq!(csv, PathBuf::from("vehicles.csv"));
                assert_eq!(keys, vec![Column::Kurzname, Column::LabelIds]);
                assert!(colored);
                assert!(output.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_comma_separated_keys() {
        let cli = Cli::parse_from(["fleetsheet", "render", "v.csv", "--keys", "hu,info"]);
        match cli.command {
            Commands::Render { keys, .. } => assert_eq!(keys, vec![Column::Hu, Column::Info]),
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Cli::try_parse_from(["fleetsheet", "run", "v.csv", "-k", "color"]).is_err());
    }
}
