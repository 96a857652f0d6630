// hm-drafter entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the tournament API client
// 4. List the scene's recent tournaments
// 5. Read operator commands from stdin until quit

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{error, info};

use hm_drafter_api::HiveMindClient;
use hm_drafter_app::app::{self, App};
use hm_drafter_app::config;
use hm_drafter_app::protocol::UserCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("hm-drafter starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: api={}, scene={}",
        config.api.base_url, config.tournament.scene
    );

    let client = HiveMindClient::new(config.api_config()).context("failed to build API client")?;
    let mut app = App::new(config, Arc::new(client));

    let mut stdout = tokio::io::stdout();
    let banner = match app.execute(UserCommand::Tournaments).await {
        Ok(list) => list,
        Err(e) => {
            error!("Could not list tournaments: {:#}", e);
            format!("Could not list tournaments: {e:#}")
        }
    };
    stdout
        .write_all(format!("{banner}\nType `help` for commands.\n").as_bytes())
        .await?;
    stdout.flush().await?;

    let stdin = BufReader::new(tokio::io::stdin());
    app::run(&mut app, stdin, &mut stdout).await?;

    info!("hm-drafter shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file so the console stays readable.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("hm-drafter.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hm_drafter=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
