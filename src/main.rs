use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    oracle_keeper::run().await
}
