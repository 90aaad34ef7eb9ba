use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    vitae_cli::run().await
}
