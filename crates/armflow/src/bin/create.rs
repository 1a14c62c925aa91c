use armflow::CommonArgs;
use armflow_cloud::{AdminCredentials, Workflow};
use armflow_config::{DEFAULT_PREFIX, PrefixPolicy};
use clap::Parser;

/// Create a resource group, network, scale set and bastion host
#[derive(Parser)]
#[command(name = "armflow-create", version, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = armflow::load_settings(&cli.common, PrefixPolicy::DefaultTo(DEFAULT_PREFIX))?;
    let provider = armflow::connect(&settings).await?;

    let admin = AdminCredentials::generate(settings.admin_username.clone());
    let report = Workflow::new(&provider, &settings).provision(admin).await?;

    armflow::print_provision_report(&report);
    Ok(())
}

#[tokio::main]
async fn main() {
    armflow::init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        armflow::exit_with(e);
    }
}
