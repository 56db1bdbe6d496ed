#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sotto_cli::run().await
}
