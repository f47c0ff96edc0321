// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! hnf1b-variants CLI
//!
//! Classify, validate, recode and annotate variants from the command line,
//! or run the REST service.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::util::SubscriberInitExt;

use hnf1b_variants::config::PredictorKind;
use hnf1b_variants::service::{self, AnnotateResponse, AppState, RecodeResponse};
use hnf1b_variants::{
    classify, parse_variant, validate_input, AssembledVariant, GenomeBuild, ServiceConfig,
};

#[derive(Parser)]
#[command(name = "hnf1b-variants")]
#[command(author, version, about = "Variant notation workflow for the HNF1B database")]
#[command(long_about = "Classify, validate, recode and annotate variant notations.

Examples:
  hnf1b-variants classify 'NM_000458.4:c.544+1G>A'
  hnf1b-variants validate 'NM_000458.4c.544+1G>A'
  hnf1b-variants recode rs56116432 -f json
  hnf1b-variants annotate 17-36459258-A-G --assembly GRCh38
  hnf1b-variants serve --port 8080")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config/hnf1b-variants.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the notation of a variant
    Classify {
        variant: String,

        /// Output format
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Validate a variant and suggest corrections
    Validate {
        variant: String,

        /// Output format
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Translate a variant into every derivable notation
    Recode {
        variant: String,

        /// Genome build (GRCh37 or GRCh38); defaults to the configured assembly
        #[arg(long)]
        assembly: Option<String>,

        /// Output format
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Predict consequences of a variant
    Annotate {
        variant: String,

        /// Genome build (GRCh37 or GRCh38); defaults to the configured assembly
        #[arg(long)]
        assembly: Option<String>,

        /// Use the offline mock predictor instead of Ensembl VEP
        #[arg(long)]
        mock: bool,

        /// Output format
        #[arg(short = 'f', long, default_value = "json", value_parser = ["text", "json"])]
        format: String,
    },

    /// Start the REST service
    Serve {
        /// Override host address
        #[arg(long)]
        host: Option<String>,

        /// Override port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a sample configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config/hnf1b-variants.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_level = match cli.command {
        Commands::Serve { .. } if cli.log_level == "warn" => "info".to_string(),
        _ => cli.log_level.clone(),
    };
    init_tracing(&log_level)?;

    match cli.command {
        Commands::Classify { variant, format } => {
            let kind = classify(variant.trim());
            if format == "json" {
                println!(
                    "{}",
                    serde_json::json!({ "input": variant, "format": kind })
                );
            } else {
                println!("{}\t{}", variant, kind);
            }
            Ok(())
        }
        Commands::Validate { variant, format } => {
            let outcome = validate_input(&variant);
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if outcome.valid {
                println!(
                    "VALID\t{}\t{}",
                    outcome.format,
                    outcome.normalized.as_deref().unwrap_or(&outcome.input)
                );
            } else {
                println!("INVALID\t{}\t{}", outcome.format, outcome.message);
                for suggestion in &outcome.suggestions {
                    println!("  did you mean: {}", suggestion);
                }
            }
            if !outcome.valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Recode {
            variant,
            assembly,
            format,
        } => {
            let config = load_config(&cli.config)?;
            let state = AppState::from_config(config)?;
            let variant_id = exit_on_error(parse_variant(&variant));
            let assembly = resolve_assembly(&state, assembly.as_deref())?;
            let recoding = exit_on_error(
                state
                    .annotator
                    .recoder()
                    .recode(&AssembledVariant::new(variant_id, assembly)),
            );
            let mut response = RecodeResponse::from(recoding);
            response.input = variant;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                let rows = [
                    ("id", &response.recoding.id),
                    ("hgvsg", &response.recoding.hgvsg),
                    ("hgvsc", &response.recoding.hgvsc),
                    ("hgvsp", &response.recoding.hgvsp),
                    ("vcf", &response.recoding.vcf_string),
                    ("spdi", &response.recoding.spdi),
                ];
                for (label, values) in rows {
                    for value in values {
                        println!("{}\t{}", label, value);
                    }
                }
            }
            Ok(())
        }
        Commands::Annotate {
            variant,
            assembly,
            mock,
            format,
        } => {
            let mut config = load_config(&cli.config)?;
            if mock {
                config.upstream.predictor = PredictorKind::Mock;
            }
            let state = AppState::from_config(config)?;
            let variant_id = exit_on_error(parse_variant(&variant));
            let assembly = resolve_assembly(&state, assembly.as_deref())?;
            let lookup = exit_on_error(
                state
                    .annotator
                    .annotate(&AssembledVariant::new(variant_id, assembly))
                    .await,
            );
            let response = AnnotateResponse::new(variant, lookup);
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                let annotation = &response.annotation;
                println!("key\t{}", response.key);
                println!("consequence\t{}", annotation.most_severe_consequence);
                if let Some(impact) = annotation.impact {
                    println!("impact\t{}", impact);
                }
                if let Some(cadd) = annotation.cadd_phred {
                    println!("cadd_phred\t{}", cadd);
                }
                if let Some(af) = annotation.gnomad_af {
                    println!("gnomad_af\t{}", af);
                }
                println!(
                    "source\t{} {}",
                    annotation.provenance.source, annotation.provenance.version
                );
            }
            Ok(())
        }
        Commands::Serve { host, port } => {
            let mut config = load_config(&cli.config)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Err(e) = config.validate() {
                error!("Configuration validation failed: {}", e);
                return Err(e.into());
            }
            info!("Starting hnf1b-variants service");
            service::serve(config).await?;
            Ok(())
        }
        Commands::Config { output, force } => config_command(&output, force),
    }
}

/// Print the error (with suggestions) and exit with the HTTP-like status class
fn exit_on_error<T>(result: hnf1b_variants::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("error[{}]: {}", e.code(), e);
            for suggestion in e.suggestions() {
                eprintln!("  did you mean: {}", suggestion);
            }
            std::process::exit(if e.is_retryable() { 75 } else { 1 });
        }
    }
}

fn resolve_assembly(
    state: &AppState,
    requested: Option<&str>,
) -> Result<GenomeBuild, Box<dyn std::error::Error>> {
    state
        .assembly(requested)
        .map_err(|e| e.to_string().into())
}

fn config_command(output_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output_path.exists() && !force {
        error!(
            "Configuration file already exists: {}",
            output_path.display()
        );
        error!("Use --force to overwrite");
        std::process::exit(1);
    }
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    ServiceConfig::default().to_file(output_path)?;
    println!(
        "Sample configuration file created: {}",
        output_path.display()
    );
    Ok(())
}

fn load_config(config_path: &Path) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    if config_path.exists() {
        info!("Loading configuration from {}", config_path.display());
        Ok(ServiceConfig::from_file(config_path)?)
    } else {
        info!(
            "Configuration file {} not found, using defaults",
            config_path.display()
        );
        Ok(ServiceConfig::default())
    }
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}
