use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    coverquote_cli::run().await
}
