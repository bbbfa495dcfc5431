//! Entry point for the Ayka timesheet binary.
//!
//! Running this binary starts an HTTP server that exposes the
//! timesheet engine and reports built from a directory of JSON source
//! files.  Configuration comes from `AYKA_*` environment variables,
//! optionally loaded from a `.env` file; see `config::Config`.

use ayka_timesheet::{api, config::Config, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    logging::init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        weekend_policy = ?config.weekend_policy,
        "starting ayka timesheet"
    );
    api::serve(&config).await
}
