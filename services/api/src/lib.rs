mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use flood_sync::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
