#[tokio::main]
async fn main() {
    // Startup failures are already logged by the server bootstrap.
    if lobby_server::run_with_config().await.is_err() {
        std::process::exit(1);
    }
}
