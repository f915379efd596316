#[tokio::main]
async fn main() -> std::io::Result<()> {
    artillery_core::run_with_config().await
}
