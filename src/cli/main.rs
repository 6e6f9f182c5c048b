//! CLI binary entry point for response-sql

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use response_sql_sdk::cli::commands::InputSource;
#[cfg(feature = "cli")]
use response_sql_sdk::cli::commands::convert::{ConvertArgs, handle_convert};
#[cfg(all(feature = "cli", feature = "openapi"))]
use response_sql_sdk::cli::commands::openapi::handle_openapi;
#[cfg(feature = "cli")]
use response_sql_sdk::cli::commands::validate::handle_validate;
#[cfg(feature = "cli")]
use response_sql_sdk::convert::ResponseAddress;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "response-sql")]
#[command(about = "Convert JSON API responses into typed SQL row-sets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON response (or JSON Lines of responses) into row-sets
    Convert {
        /// Spec document (YAML or JSON); defaults to the configured source's spec
        #[arg(short, long)]
        spec: Option<PathBuf>,
        /// Top-level table name
        #[arg(short, long)]
        table: String,
        /// Input file, '-' for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Dotted address of the records in each response, e.g. data.customers
        #[arg(long)]
        records_at: Option<ResponseAddress>,
        /// Directory containing .response-sql.toml
        #[arg(short, long, default_value = ".")]
        config: PathBuf,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Load a spec document and print the tables it produces
    Validate {
        /// Spec document (YAML or JSON)
        spec: PathBuf,
        /// Name used for the top-level table
        #[arg(short, long, default_value = "root")]
        table: String,
    },
    /// Derive a spec document from an OpenAPI response schema
    #[cfg(feature = "openapi")]
    Openapi {
        /// OpenAPI document (YAML or JSON)
        document: PathBuf,
        /// API path whose GET response is described, e.g. /customers
        #[arg(short, long)]
        path: String,
    },
}

#[cfg(feature = "cli")]
fn main() {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            spec,
            table,
            input,
            records_at,
            config,
            pretty,
        } => {
            let args = ConvertArgs {
                spec,
                table,
                input: InputSource::from_arg(&input),
                records_at,
                workspace: config,
                pretty,
            };
            handle_convert(&args)
        }
        Commands::Validate { spec, table } => handle_validate(&spec, &table),
        #[cfg(feature = "openapi")]
        Commands::Openapi { document, path } => handle_openapi(&document, &path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
