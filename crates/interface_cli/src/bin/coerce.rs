//! Coerce - command-line value converter
//!
//! # Usage
//!
//! ```bash
//! # Convert a literal to a domain
//! coerce 19/02/2002 --to timestamp --locale fr-FR
//!
//! # Read the literal in a source domain first
//! coerce 2023-04-14T21:56:30+06:00 --from OffsetDateTime --to LocalDate
//!
//! # Convert the absent value
//! coerce --null --to char --json
//! ```
//!
//! # Environment Variables
//!
//! * `COERCE_LOCALE` - Locale of the date parser (default: en-US)
//! * `COERCE_TIMEZONE` - Zone of local date/time values (default: UTC)
//! * `COERCE_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{Timezone, TypeRegistry};
use domain_coercion::{Coercer, CoercionConfig};
use interface_cli::{parse_target, Request};

#[derive(Parser)]
#[command(name = "coerce")]
#[command(about = "Convert a literal to a target type")]
#[command(version)]
struct Cli {
    /// The literal to convert
    #[arg(value_name = "VALUE", required_unless_present = "null")]
    value: Option<String>,

    /// Target type name (i32, double, LocalDate, string, ...)
    #[arg(short, long)]
    to: String,

    /// Type the literal is read as before conversion
    #[arg(short, long)]
    from: Option<String>,

    /// Convert the absent value instead of a literal
    #[arg(long, conflicts_with = "value")]
    null: bool,

    /// Locale of the date parser, overrides COERCE_LOCALE
    #[arg(long)]
    locale: Option<String>,

    /// Zone of local date/time values, overrides COERCE_TIMEZONE
    #[arg(long)]
    timezone: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config.log_level);

    let coercer = Coercer::from_config(TypeRegistry::with_builtins(), &config)
        .context("invalid coercion configuration")?;

    let request = Request {
        input: if cli.null { None } else { cli.value.clone() },
        from: cli.from.as_deref().map(parse_target).transpose()?,
        to: parse_target(&cli.to)?,
    };

    let outcome = request.execute(&coercer)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{} ({})", outcome.value, outcome.value_type);
    }

    Ok(())
}

/// Loads configuration from the environment, then applies command-line overrides
fn load_config(cli: &Cli) -> Result<CoercionConfig> {
    let mut config = CoercionConfig::from_env().unwrap_or_else(|e| {
        eprintln!("ignoring malformed COERCE_* environment: {e}");
        CoercionConfig::default()
    });

    if let Some(locale) = &cli.locale {
        config.locale = locale.clone();
    }
    if let Some(timezone) = &cli.timezone {
        config.timezone =
            Timezone::parse(timezone).with_context(|| format!("invalid --timezone {timezone}"))?;
    }
    Ok(config)
}

/// Initializes the tracing subscriber; `RUST_LOG` takes precedence over the
/// configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
