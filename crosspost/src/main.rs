mod logging;
mod menu;
mod ops;
mod prompt;
mod session;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_path = logging::init_logging()?;
    tracing::info!("crosspost starting");
    println!("Logging to {}", log_path.display());

    menu::run().await
}
