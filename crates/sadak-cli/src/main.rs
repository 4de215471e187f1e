//! CLI entry point: the composition root.
//!
//! Bootstraps settings storage and the speech engine, then routes the
//! parsed command to its handler.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sadak_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    // Pure commands need no settings or engine.
    if let Commands::Chunk { text, max_chars } = &command {
        handlers::chunk::execute(text, *max_chars);
        return Ok(());
    }

    let ctx = bootstrap(CliConfig {
        data_dir: cli.data_dir,
        voice_locales: cli.voice_locales,
        ..CliConfig::default()
    })?;

    match command {
        Commands::Speak { text, lang } => {
            handlers::speak::execute(&ctx, &text, lang.as_deref()).await?;
        }
        Commands::Chunk { .. } => {}
        Commands::Resolve { lang } => handlers::resolve::execute(&ctx, &lang),
        Commands::Voices => handlers::voices::execute(&ctx),
        Commands::Repl => handlers::repl::execute(&ctx).await?,
        Commands::Settings { command } => handlers::settings::execute(&ctx, command).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}
