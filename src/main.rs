#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = evalsheet_rust::run().await {
        eprintln!("evalsheet-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
