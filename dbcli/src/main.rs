//! dbcli entry point.
//!
//! Loads the connection configuration once, builds the gateway once, and
//! hands both to the dispatcher for the single command of this invocation.

use clap::Parser;
use dbcli::{Cli, ExitPolicy, run};
use dbcli_core::{
    ConnectionConfig, PostgresGateway, Presenter, config::DEFAULT_SECTION, init_logging,
    presenter::color_enabled,
};
use std::process::ExitCode;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("{}", e);
    }

    let policy = ExitPolicy::from_flag(cli.global.strict_exit);
    let mut presenter = Presenter::stdout(color_enabled(cli.global.no_color));

    let config = match ConnectionConfig::from_ini_file(&cli.global.config, DEFAULT_SECTION) {
        Ok(config) => config,
        Err(e) => {
            debug!("Failed to load configuration: {}", e);
            if let Err(write_error) = presenter.error(&e) {
                eprintln!("{}", write_error);
            }
            return ExitCode::from(policy.status(false));
        }
    };
    debug!("Using {}", config);

    let gateway = PostgresGateway::new(config);
    let succeeded = run(&cli.command, &gateway, &mut presenter).await;

    ExitCode::from(policy.status(succeeded))
}
