use clap::Parser;

mod cli;
mod commands;
mod output;
mod progress;

fn main() {
    if let Err(error) = run() {
        eprintln!("ush error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = usher_config::UsherConfig::load_with_dotenv()?;

    match &cli.command {
        cli::Commands::Parse(args) => commands::parse::handle(args, &flags),
        cli::Commands::Plan(args) => commands::plan::handle(args, &config, &flags),
        cli::Commands::Rounds(args) => commands::rounds::handle(args, &config, &flags),
        cli::Commands::Status(args) => commands::status::handle(args, &config, &flags),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("USHER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
