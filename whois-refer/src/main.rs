//! whois-refer CLI Application
//!
//! Looks up domains through the root WHOIS authority and the registry it
//! refers to, prints each raw answer and says whether the domain is
//! available.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use futures::StreamExt;
use serde_json::json;
use std::process;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use whois_refer_lib::{
    load_env_config, normalize_domains, parse_timeout_string, ConfigManager, FileConfig,
    LookupConfig, LookupResult, Record, WhoisChecker, WhoisError, MAX_CONCURRENCY,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for whois-refer
#[derive(Parser, Debug)]
#[command(name = "whois-refer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up domains over WHOIS and tell whether they are available")]
#[command(
    long_about = "Look up domains over WHOIS (RFC 3912).\n\nThe root authority is asked which registry serves the domain, then that registry is queried. The raw answer is printed followed by 'available' or 'not available'."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to look up
    #[arg(value_name = "DOMAIN")]
    pub domains: Vec<String>,

    /// Print {"available", "whois"} JSON objects instead of raw answers
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Print the extracted record after the raw answer
    #[arg(short = 'r', long = "records", help_heading = "Output Format")]
    pub records: bool,

    /// Deadline for each connect, write and read (e.g. 3s, 500ms, 1m)
    #[arg(short = 't', long = "timeout", value_name = "DURATION", help_heading = "Lookup")]
    pub timeout: Option<String>,

    /// Root WHOIS authority asked for the referral
    #[arg(long = "root-server", value_name = "HOST", help_heading = "Lookup")]
    pub root_server: Option<String>,

    /// TCP port used for both hops
    #[arg(long = "port", value_name = "PORT", help_heading = "Lookup")]
    pub port: Option<u16>,

    /// Max lookups running at once (1-50)
    #[arg(short = 'c', long = "concurrency", value_name = "N", help_heading = "Lookup")]
    pub concurrency: Option<usize>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging on stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Everything a run needs once files, environment and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub lookup: LookupConfig,
    pub json: bool,
    pub json_pretty: bool,
    pub records: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.domains.is_empty() {
        println!("Domain not specified. Exiting.");
        process::exit(1);
    }

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the `--verbose` default.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(format!(
                "Concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            ));
        }
    }

    if args.port == Some(0) {
        return Err("Port must be greater than zero".to_string());
    }

    if let Some(timeout) = &args.timeout {
        match parse_timeout_string(timeout) {
            Some(d) if !d.is_zero() => {}
            _ => {
                return Err(format!(
                    "Invalid timeout '{}'. Use format like '3s', '500ms', '1m'",
                    timeout
                ))
            }
        }
    }

    if args.pretty && !args.json {
        return Err("--pretty only applies to --json output".to_string());
    }

    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;
    debug!(?settings, "effective settings");
    let domains = normalize_domains(&args.domains);

    if domains.is_empty() {
        return Err("No usable domain names given".into());
    }

    let checker = WhoisChecker::with_config(settings.lookup.clone());
    let multiple = domains.len() > 1;

    let mut results = checker.lookup_stream(&domains);
    while let Some((domain, outcome)) = results.next().await {
        if let Err(e) = &outcome {
            ui::print_lookup_error(&domain, e);
        }

        if settings.json {
            display_json(&outcome, settings.json_pretty)?;
        } else {
            display_text(&domain, &outcome, &settings, multiple);
        }
    }

    Ok(())
}

/// Build settings with precedence: defaults < config files < WR_* env < CLI flags.
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config(args.verbose);

    // Step 1: config file, explicit or discovered
    let file_config = if let Some(path) = args.config.as_ref().or(env_config.config.as_ref()) {
        config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else {
        match config_manager.discover_and_load() {
            Ok(file_config) => file_config,
            Err(e) => {
                if args.verbose {
                    eprintln!("⚠️ Config discovery warning: {}", e);
                }
                FileConfig::default()
            }
        }
    };

    let output = file_config.output.clone().unwrap_or_default();
    let mut settings = Settings {
        lookup: file_config.apply_to(LookupConfig::default()),
        json: output.json.unwrap_or(false),
        json_pretty: output.json_pretty.unwrap_or(false),
        records: output.records.unwrap_or(false),
    };

    // Step 2: environment variables (WR_*)
    settings.lookup = env_config.apply_to(settings.lookup);
    if let Some(json) = env_config.json {
        settings.json = json;
    }

    // Step 3: CLI arguments (highest precedence)
    apply_cli_args(&mut settings, args)?;

    Ok(settings)
}

fn apply_cli_args(settings: &mut Settings, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(timeout_str) = &args.timeout {
        let timeout = parse_timeout_string(timeout_str)
            .ok_or_else(|| format!("Invalid timeout '{}'", timeout_str))?;
        settings.lookup = settings.lookup.clone().with_timeout(timeout);
    }
    if let Some(root_server) = &args.root_server {
        settings.lookup = settings.lookup.clone().with_root_server(root_server.clone());
    }
    if let Some(port) = args.port {
        settings.lookup = settings.lookup.clone().with_port(port);
    }
    if let Some(concurrency) = args.concurrency {
        settings.lookup = settings.lookup.clone().with_concurrency(concurrency);
    }
    if args.json {
        settings.json = true;
    }
    if args.pretty {
        settings.json_pretty = true;
    }
    if args.records {
        settings.records = true;
    }
    Ok(())
}

/// JSON body for one lookup, shaped like the HTTP frontend's answer.
///
/// A failed lookup reports as unavailable-false with an empty record.
fn json_payload(outcome: &Result<LookupResult, WhoisError>) -> serde_json::Value {
    match outcome {
        Ok(result) => json!({ "available": result.available, "whois": result.whois }),
        Err(_) => json!({ "available": false, "whois": Record::default() }),
    }
}

fn display_json(
    outcome: &Result<LookupResult, WhoisError>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = json_payload(outcome);
    let json = if pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };
    println!("{}", json);
    Ok(())
}

fn display_text(
    domain: &str,
    outcome: &Result<LookupResult, WhoisError>,
    settings: &Settings,
    multiple: bool,
) {
    if multiple {
        ui::print_domain_header(domain);
    }

    match outcome {
        Ok(result) => {
            ui::print_raw(&result.raw_text());
            ui::print_verdict(result.available);
            if settings.records {
                ui::print_record(&result.whois);
            }
        }
        Err(_) => {
            // Failed lookups still print an (empty) answer and a verdict.
            ui::print_raw("");
            ui::print_verdict(false);
        }
    }
}
