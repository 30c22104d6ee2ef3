mod scenario;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hl7_core::constants::{HEADER_CONFIG_ENV_VAR, TIMEZONE_ENV_VAR};
use hl7_core::{timezone_from_env_value, Hl7Config, MessageBuilder, SUPPORTED_VARIANTS};
use hl7_header::{HeaderConfig, HeaderGenerator};
use scenario::Scenario;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hl7sim")]
#[command(about = "Simulated HL7v2 message builder")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the message described by a scenario file and print it
    Render {
        /// Scenario YAML file
        scenario: PathBuf,
        /// Protocol time zone, e.g. Europe/London (default: $HL7_TIMEZONE, then UTC)
        #[arg(long)]
        timezone: Option<String>,
        /// Header config YAML, used when the scenario has no inline header
        /// (default: $HL7_HEADER_CONFIG)
        #[arg(long)]
        header_config: Option<PathBuf>,
        /// Print segments separated by carriage returns, as sent on the wire
        #[arg(long)]
        raw: bool,
    },
    /// List supported message types
    Variants,
}

/// # Environment Variables
/// - `HL7_TIMEZONE`: protocol time zone (default: UTC)
/// - `HL7_HEADER_CONFIG`: path to the header config YAML
/// - `RUST_LOG`: log filter (default: `hl7sim=info`)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("hl7sim=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render {
            scenario,
            timezone,
            header_config,
            raw,
        }) => {
            let timezone = timezone_from_env_value(
                timezone.or_else(|| std::env::var(TIMEZONE_ENV_VAR).ok()),
            )?;
            let header_config = header_config
                .or_else(|| std::env::var(HEADER_CONFIG_ENV_VAR).ok().map(PathBuf::from));
            let header_config = match header_config {
                Some(path) => HeaderConfig::from_path(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
                None => HeaderConfig::default(),
            };

            let scenario = Scenario::from_path(&scenario)?;
            let header = scenario.header(&HeaderGenerator::new(header_config));
            let request = scenario.request(&header, chrono::Utc::now());

            let message = MessageBuilder::new(Hl7Config::new(timezone)).build(&request)?;
            tracing::info!(
                message_type = %message.message_type(),
                control_id = %header.message_control_id,
                timezone = %timezone,
                "rendered message"
            );

            if raw {
                print!("{}", message.text());
            } else {
                for segment in message.segments() {
                    println!("{segment}");
                }
            }
        }
        Some(Commands::Variants) => {
            for (code, event) in SUPPORTED_VARIANTS {
                println!("{code}^{event}");
            }
        }
        None => {
            println!("Use 'hl7sim --help' for commands");
        }
    }

    Ok(())
}
