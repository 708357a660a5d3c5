mod cli;
mod infra;
mod routes;
mod server;
mod tasks;

use bunk_ai::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
