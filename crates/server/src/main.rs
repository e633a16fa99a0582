#[tokio::main]
async fn main() -> anyhow::Result<()> {
    emojipedia_server::run().await
}
