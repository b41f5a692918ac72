use answerhub_ban::cli;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = cli::start().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
