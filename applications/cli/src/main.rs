/// ConvFade - convolution-filtered crossfades between two audio files
use clap::Parser;
use convfade_cli::{run, Cli, CrossfadeConfig, Job};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CrossfadeConfig::load(cli.config.as_deref(), &cli.overrides())?;
    tracing::debug!("Configuration: {:?}", config);

    let job = Job {
        start: cli.start,
        end: cli.end,
        output: cli.output,
    };
    run(&job, &config)?;

    Ok(())
}
