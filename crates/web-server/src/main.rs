use configuration::{init_tracing, load_config};

// Entry point for `cargo run -p web-server`. The `stockroom` binary offers the full CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _guard = init_tracing(&config.logging)?;
    web_server::run_server(config).await
}
