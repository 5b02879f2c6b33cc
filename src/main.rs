#[tokio::main]
async fn main() -> anyhow::Result<()> {
    folio::app::run().await
}
