use std::time::Duration;

use facet::Facet;
use figue as args;
use tracing_subscriber::EnvFilter;

mod scenarios;

use scenarios::Reporter;

type AnyResult<T> = Result<T, String>;

const DEFAULT_INTERVAL_MS: u64 = 500;
const DEFAULT_ROUNDS: u32 = 10;

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::named, default)]
    interval_ms: Option<u64>,
    #[facet(args::named, default)]
    rounds: Option<u32>,
    #[facet(args::named, default)]
    json: bool,
    #[facet(args::subcommand)]
    command: CommandKind,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum CommandKind {
    ChannelFullStall,
    ShortLivedChannels,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> AnyResult<()> {
    let cli = parse_cli()?;
    let reporter = Reporter::new(
        Duration::from_millis(cli.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS).max(1)),
        cli.rounds.unwrap_or(DEFAULT_ROUNDS),
        cli.json,
    );
    match cli.command {
        CommandKind::ChannelFullStall => scenarios::channel_full_stall::run(&reporter).await,
        CommandKind::ShortLivedChannels => scenarios::short_lived_channels::run(&reporter).await,
    }
}

fn parse_cli() -> AnyResult<Cli> {
    let schema = args::builder::<Cli>()
        .map_err(|e| format!("brim-examples: invalid CLI definition: {e}"))?;
    let config = schema
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name(env!("CARGO_PKG_NAME"))
                .description(
                    "Stall or churn brim channels and print what brim::sample() reports each round",
                )
                .version(env!("CARGO_PKG_VERSION"))
        })
        .build();

    match args::Driver::new(config).run().into_result() {
        Ok(parsed) => Ok(parsed.value),
        Err(outcome) => Err(outcome.to_string()),
    }
}
