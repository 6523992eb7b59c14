#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tabdock_lib::run().await
}
