mod cli;
mod infra;
mod roster;
mod routes;
mod server;

use personnel_compliance::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
