use anyhow::Context;
use bootkit_demo::App;

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "app".to_owned());

    // Vault is read over blocking HTTP, so everything is wired before the runtime starts.
    let app = App::builder().config_path(path).with_logging().build().context("Critical: Startup failed")?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?
        .block_on(app.run())
}
