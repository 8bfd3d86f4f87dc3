mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `RUST_LOG` wins; otherwise debug, quiet, or info.
fn init_tracing(debug: bool, quiet: bool) {
    let filter = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration and install logging. CLI flags override the file.
fn setup(global: &GlobalOpts) -> Result<unipoll_config::Config, CliError> {
    let config = unipoll_config::load_config(global.config.as_deref())?;
    let debug = global.debug || (config.debug && !global.quiet);
    let quiet = !debug && (global.quiet || config.quiet);
    init_tracing(debug, quiet);
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "unipoll", &mut std::io::stdout());
            Ok(())
        }

        Command::Run => {
            let config = setup(&cli.global)?;
            commands::run(&config).await
        }

        Command::Dump(args) => {
            let config = setup(&cli.global)?;
            commands::dump(&config, args.target).await
        }
    }
}
