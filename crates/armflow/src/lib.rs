//! Shared plumbing of the armflow binaries
//!
//! Both binaries parse [`CommonArgs`], resolve [`Settings`] before touching
//! any credential, connect once and run a single fixed workflow.

use anyhow::Context;
use armflow_cloud::{ExtensionReport, ProvisionReport};
use armflow_cloud_azure::{AzureProvider, DefaultCredential};
use armflow_config::{Overrides, PrefixPolicy, Settings};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

/// Flags accepted by every binary
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Resource name prefix
    #[arg(short, long, env = "MS_ALIAS")]
    pub prefix: Option<String>,

    /// Azure region (default: westus2)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Seconds between operation status checks (default: 10)
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,
}

impl CommonArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            prefix: self.prefix.clone(),
            location: self.location.clone(),
            poll_interval_secs: self.poll_interval,
        }
    }
}

/// Log to stderr, `info` unless `RUST_LOG` says otherwise
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Resolve settings; nothing remote happens before this succeeds
pub fn load_settings(args: &CommonArgs, policy: PrefixPolicy) -> anyhow::Result<Settings> {
    let settings = Settings::load(args.overrides(), policy)?;
    tracing::debug!("{:?}", settings);
    Ok(settings)
}

/// Acquire a token through the default credential chain
pub async fn connect(settings: &Settings) -> anyhow::Result<AzureProvider> {
    let credential = Arc::new(DefaultCredential::new());
    AzureProvider::connect(&settings.subscription_id, credential)
        .await
        .context("failed to obtain an Azure access token")
}

pub fn print_provision_report(report: &ProvisionReport) {
    println!();
    println!("{}", "✓ Provisioning complete".green().bold());
    println!();

    let rows = [
        ("Resource group", &report.resource_group.id),
        ("Virtual network", &report.virtual_network.id),
        ("Subnet", &report.subnet.id),
        ("Scale set", &report.scale_set.id),
        ("Public IP", &report.public_ip.id),
        ("Bastion subnet", &report.bastion_subnet.id),
        ("Bastion host", &report.bastion_host.id),
    ];
    for (label, id) in rows {
        println!("  {:<16} {}", format!("{}:", label).cyan(), id);
    }

    println!();
    println!(
        "{} {}/{}",
        "Username/password:".yellow().bold(),
        report.admin.username,
        report.admin.password
    );
}

pub fn print_extension_report(report: &ExtensionReport) {
    println!();
    println!("{}", "✓ Extension rolled out".green().bold());
    println!();
    println!("  {:<16} {}", "Extension:".cyan(), report.extension.id);
    println!("  {:<16} {}", "Upgrade:".cyan(), report.upgrade_status);
}

/// Print the error chain and exit 1
pub fn exit_with(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);
    std::process::exit(1);
}
