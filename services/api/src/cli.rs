use crate::demo::{run_demo, run_pool, DemoArgs, PoolArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use flood_sync::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "FloodSync",
    about = "Run and demonstrate the FloodSync peer validation service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk through report submission, peer voting, and the dashboard in memory
    Demo(DemoArgs),
    /// Print the reports currently open for peer validation
    Pool(PoolArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Base URL of a json-server style report store (in-memory when omitted)
    #[arg(long)]
    pub(crate) store_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::Pool(args) => run_pool(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["flood-sync"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "flood-sync",
            "serve",
            "--port",
            "9000",
            "--store-url",
            "http://localhost:3000",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.store_url.as_deref(), Some("http://localhost:3000"));
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
