use std::path::PathBuf;

use anyhow::{Context, Result};
use bus_time_travel_infra::{
    deploy, DeploymentConfig, Manifest, NamingStrategy, ProviderContext, Stack,
    DEFAULT_ARTIFACT_DIR,
};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};

mod account;

#[derive(Parser, Debug)]
#[command(
    name = "bus-time-travel",
    version,
    about = "Synthesize the bus time travel infrastructure into a desired-state manifest"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Stack name, used as the URN prefix
    #[arg(long, global = true, env = "BUS_TIME_TRAVEL_STACK", default_value = "dev")]
    stack: String,

    #[arg(long, global = true, env = "AWS_PARTITION", default_value = "aws")]
    partition: String,

    #[arg(long, global = true, env = "AWS_REGION", default_value = "*")]
    region: String,

    /// Account id used in IAM and Lambda ARNs
    #[arg(long, global = true, env = "AWS_ACCOUNT_ID")]
    account: Option<String>,

    /// Resolve the account id via sts:GetCallerIdentity when --account is not given
    #[arg(long, global = true)]
    lookup_account: bool,

    /// Directory holding the built history function
    #[arg(long, global = true, default_value = DEFAULT_ARTIFACT_DIR)]
    artifact_dir: PathBuf,

    /// Append random suffixes to physical resource names
    #[arg(long, global = true)]
    auto_name: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the desired-state manifest as JSON
    Synth {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the resources an engine would create
    Preview,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn synthesize(global: &GlobalArgs) -> Result<Manifest> {
    let account = account::resolve_account(global.account.clone(), global.lookup_account).await?;
    let context = ProviderContext::new(&global.partition, &global.region, account);
    let naming = if global.auto_name {
        NamingStrategy::Suffixed
    } else {
        NamingStrategy::Exact
    };
    debug!("Provider context: {:?}, naming: {:?}", context, naming);

    let mut stack = Stack::new(&global.stack);
    let config = DeploymentConfig {
        artifact_dir: global.artifact_dir.clone(),
        ..DeploymentConfig::default()
    };
    deploy(&mut stack, &config).context("Failed to declare the deployment")?;

    stack
        .synthesize(&context, naming)
        .await
        .context("Failed to synthesize the stack")
}

async fn run(cli: Cli) -> Result<()> {
    let manifest = synthesize(&cli.global).await?;

    match cli.command {
        Commands::Synth { output, compact } => {
            let json = if compact {
                manifest.to_json()?
            } else {
                manifest.to_json_pretty()?
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote manifest to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Preview => print!("{}", manifest.preview()),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
