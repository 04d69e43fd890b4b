//! Command handlers

use crate::cli::{Cli, Commands};
use crate::output::output_records;
use chrono::Local;
use fleetsheet_app::app::{Pipeline, PipelineOutput, UploadClient};
use fleetsheet_app::config::Config;
use fleetsheet_app::export::{default_file_name, export_to_excel, ExportOptions};
use fleetsheet_app::server::{self, AppState};
use fleetsheet_infra::api::LabelOutcome;
use fleetsheet_infra::client_csv::load_client_file;
use fleetsheet_types::{ensure_unique_columns, Column, Error, OutputFormat, Result, VehicleRecord};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let config = Config::load()?;

    match cli.command {
        Commands::Run {
            csv,
            keys,
            colored,
            output,
        } => {
            // Reject bad keys before any network traffic
            let options = export_options(keys, colored)?;
            cmd_run(&config, csv, &options, output)
        }

        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            cmd_serve(&config, &bind)
        }

        Commands::Render {
            csv,
            server,
            keys,
            colored,
            output,
        } => {
            let options = export_options(keys, colored)?;
            let server_url = server.unwrap_or_else(|| config.server_url.clone());
            cmd_render(&config, csv, &server_url, &options, output)
        }

        Commands::Show { csv, format } => {
            let output_format = format.unwrap_or(config.output_format);
            cmd_show(&config, csv, output_format)
        }

        Commands::Config {
            show,
            set_base_url,
            set_concurrency,
            reset,
        } => cmd_config(show, set_base_url, set_concurrency, reset),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn pipeline(config: &Config) -> Result<Pipeline> {
    config.validate()?;
    Pipeline::from_settings(&config.api_settings())
}

fn run_pipeline(config: &Config, csv: &Path) -> Result<PipelineOutput> {
    let client = load_client_file(csv)?;
    let pipeline = pipeline(config)?;
    let output = runtime()?.block_on(pipeline.run(client))?;
    report_failures(&output);
    Ok(output)
}

fn report_failures(output: &PipelineOutput) {
    for (record, outcome) in output.failures() {
        if let LabelOutcome::Failed { label_id, error } = outcome {
            warn!(
                kurzname = record.short_name.as_deref().unwrap_or("-"),
                label_id = %label_id,
                "No color for label: {}",
                error
            );
        }
    }
}

/// Sheet options from the command line, keys checked for duplicates
fn export_options(keys: Vec<Column>, colored: bool) -> Result<ExportOptions> {
    ensure_unique_columns(&keys)?;
    Ok(ExportOptions::new(keys, colored))
}

fn write_sheet(
    records: &[VehicleRecord],
    options: &ExportOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    // Determine output path
    let output_path = output.unwrap_or_else(|| PathBuf::from(default_file_name(&Local::now())));

    export_to_excel(records, options, &output_path)?;

    println!("Exported {} vehicles to: {}", records.len(), output_path.display());
    Ok(())
}

fn cmd_run(
    config: &Config,
    csv: PathBuf,
    options: &ExportOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    let result = run_pipeline(config, &csv)?;
    write_sheet(&result.records, options, output)
}

fn cmd_serve(config: &Config, bind: &str) -> Result<()> {
    let state = AppState::new(pipeline(config)?).with_upload_limit(config.upload_limit_bytes);
    println!("Listening on http://{}", bind);
    runtime()?.block_on(server::serve(state, bind))
}

fn cmd_render(
    config: &Config,
    csv: PathBuf,
    server_url: &str,
    options: &ExportOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    if !csv.exists() {
        return Err(Error::FileNotFound(csv.display().to_string()));
    }
    let body = std::fs::read(&csv)?;

    let client = UploadClient::new(server_url, Duration::from_secs(config.request_timeout_secs));
    let file_name = csv
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.csv");
    let records = runtime()?.block_on(client.upload(file_name, body))?;

    write_sheet(&records, options, output)
}

fn cmd_show(config: &Config, csv: PathBuf, output_format: OutputFormat) -> Result<()> {
    let result = run_pipeline(config, &csv)?;
    output_records(output_format, &result.records)
}

fn cmd_config(
    show: bool,
    set_base_url: Option<String>,
    set_concurrency: Option<usize>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(base_url) = set_base_url {
        config.api_base_url = base_url;
        modified = true;
    }

    if let Some(concurrency) = set_concurrency {
        config.label_concurrency = concurrency;
        modified = true;
    }

    if modified {
        config.validate()?;
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
