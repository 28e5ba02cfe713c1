//! # LabFlow Configuration Validator
//!
//! Command-line tool for validating LabFlow configuration before deploying
//! the workflow core. Loads the YAML configuration for an environment, runs
//! the same validation the bootstrap runs, and checks that every template the
//! domain handlers and task policies render exists for its role on every
//! channel.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use labflow_core::config::{ConfigManager, WorkflowConfig};
use labflow_core::constants::RoleCode;
use labflow_core::events::handlers::HANDLER_TEMPLATES;
use labflow_core::orchestration::policies::POLICY_TEMPLATES;
use labflow_core::templates::{Channel, TemplateManager, TemplateName};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "labflow-config-validator")]
#[command(about = "Validate LabFlow configuration and the message catalog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (development, test, production)
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Configuration directory path (default: ./config or LABFLOW_CONFIG_DIR)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate configuration and templates
    All,

    /// Validate configuration only
    Config,

    /// Validate templates only
    Templates,

    /// Print the loaded configuration with secrets masked
    Show,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = match &cli.command {
        Some(Commands::Config) => validate_config(&cli).map(|_| ()),
        Some(Commands::Templates) => validate_templates(None),
        Some(Commands::Show) => show_config(&cli),
        Some(Commands::All) | None => validate_all(&cli),
    };

    match result {
        Ok(()) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            println!("\n❌ {e:#}");
            process::exit(1);
        }
    }
}

fn load(cli: &Cli) -> Result<WorkflowConfig> {
    let manager =
        ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &cli.environment)
            .with_context(|| format!("loading {} configuration", cli.environment))?;
    println!(
        "✅ Loaded {} configuration from {}",
        manager.environment(),
        manager.config_directory().display()
    );
    Ok(manager.config().clone())
}

fn validate_all(cli: &Cli) -> Result<()> {
    let config = validate_config(cli)?;
    validate_templates(Some(&config))?;
    println!("\n🎉 All configuration validation checks passed!");
    Ok(())
}

fn validate_config(cli: &Cli) -> Result<WorkflowConfig> {
    println!("🔧 Validating LabFlow Configuration");
    println!("Environment: {}", cli.environment);
    if let Some(dir) = &cli.config_dir {
        println!("Config Directory: {}", dir.display());
    }
    println!();

    let config = load(cli)?;

    println!("🗄️  Database");
    match config.database.url.as_deref() {
        Some(url) if !url.is_empty() => println!(
            "   ✅ PostgreSQL stores (max connections: {})",
            config.database.max_connections
        ),
        _ => println!("   ℹ️  No database URL, in-memory stores will be used"),
    }

    println!("⏰ Sweeper");
    println!(
        "   ✅ enabled: {}, every {}s, batch {}, reminders every {} day(s)",
        config.sweeper.enabled,
        config.sweeper.interval_seconds,
        config.sweeper.batch_size,
        config.sweeper.reminder_interval_days
    );

    println!("📬 Dispatcher");
    println!(
        "   ✅ max attempts {}, backoff {}ms..{}ms",
        config.dispatcher.max_attempts,
        config.dispatcher.backoff_base_ms,
        config.dispatcher.backoff_max_ms
    );

    println!("📧 Mail");
    if config.mail.enabled {
        println!(
            "   ✅ SMTP {}:{} from {}",
            config.mail.smtp_host, config.mail.smtp_port, config.mail.from_address
        );
    } else {
        println!("   ℹ️  Mail disabled, e-mails are logged only");
    }

    Ok(config)
}

/// Every `(template, role)` pair must render on every channel
fn validate_templates(config: Option<&WorkflowConfig>) -> Result<()> {
    println!("\n📝 Validating Message Catalog");
    let manager = match config {
        Some(config) => TemplateManager::new(config.templates.portal_name.clone()),
        None => TemplateManager::default(),
    };

    let missing = missing_templates(
        &manager,
        HANDLER_TEMPLATES.iter().chain(POLICY_TEMPLATES.iter()),
    );

    if missing.is_empty() {
        println!(
            "   ✅ {} handler and {} policy templates resolve on every channel",
            HANDLER_TEMPLATES.len(),
            POLICY_TEMPLATES.len()
        );
        return Ok(());
    }

    for (name, role, channel) in &missing {
        println!("   ❌ {name} for {role} has no {channel} text");
    }
    bail!("{} template(s) missing", missing.len())
}

fn missing_templates<'a>(
    manager: &TemplateManager,
    pairs: impl Iterator<Item = &'a (TemplateName, RoleCode)>,
) -> Vec<(TemplateName, RoleCode, Channel)> {
    pairs
        .flat_map(|(name, role)| Channel::ALL.iter().map(move |channel| (*name, *role, *channel)))
        .filter(|(name, role, channel)| !manager.has_template(*name, *role, *channel))
        .collect()
}

fn show_config(cli: &Cli) -> Result<()> {
    let manager =
        ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &cli.environment)
            .with_context(|| format!("loading {} configuration", cli.environment))?;
    println!("{}", serde_json::to_string_pretty(&manager.debug_config())?);
    Ok(())
}
