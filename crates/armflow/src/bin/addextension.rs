use armflow::CommonArgs;
use armflow_cloud::Workflow;
use armflow_config::PrefixPolicy;
use clap::Parser;

/// Add the custom-script extension to an existing scale set and upgrade instance 0
#[derive(Parser)]
#[command(name = "armflow-addextension", version, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = armflow::load_settings(&cli.common, PrefixPolicy::Required)?;
    let provider = armflow::connect(&settings).await?;

    let report = Workflow::new(&provider, &settings).extend().await?;

    armflow::print_extension_report(&report);
    Ok(())
}

#[tokio::main]
async fn main() {
    armflow::init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        armflow::exit_with(e);
    }
}
