mod cli;
mod infra;
mod routes;
mod server;
mod submit;

use job_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
