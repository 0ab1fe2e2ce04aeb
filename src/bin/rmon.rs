use clap::Parser;
use rmon::{
    api::{ApiState, spawn_api_server},
    config::{Config, read_config_file},
    registry::Registry,
};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Registry and health/metrics gateway for redis servers")]
struct Args {
    /// Config file (JSON); defaults apply when omitted
    #[arg(short, long)]
    file: Option<String>,

    /// Log everything down to TRACE
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    dotenv::dotenv().ok();

    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![
        ("rmon", level),
        ("tower_http", level),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    }
    .apply_env();

    let store = config.storage.open().await?;
    let registry = Registry::new(store.clone());
    let state = ApiState::new(registry, config.probe.prober());

    spawn_api_server(config.api, state).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    store.close().await?;

    Ok(())
}
