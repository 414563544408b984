mod api;
mod config;
mod error;
mod monitor;

use api::coingecko::rest::CoinGeckoClient;
use api::sendgrid::mail::SendGridClient;
use config::{MailSettings, MonitorSettings};
use env_logger::Builder;
use log::{info, warn, LevelFilter};
use monitor::watcher::PriceMonitor;
use monitor::TokioSleeper;
use std::error::Error;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // .env is optional
    let dotenv_loaded = dotenv::dotenv().is_ok();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("xrpwatch", LevelFilter::Debug)
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();

    if dotenv_loaded {
        info!("Loaded environment from .env");
    }

    let settings = MonitorSettings::from_env();
    let mail = MailSettings::from_env();
    if mail.credentials().is_none() {
        warn!("SendGrid not fully configured; alerts will be skipped");
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("xrpwatch/", env!("CARGO_PKG_VERSION")))
        .build()?;

    info!(
        "Watching {} ({}) every {}s, alert on moves >= ${}",
        settings.symbol,
        settings.asset_id,
        settings.interval.as_secs(),
        settings.threshold
    );

    let source = CoinGeckoClient::new(http.clone(), settings.asset_id.clone());
    let notifier = SendGridClient::new(http, mail);
    let mut monitor = PriceMonitor::new(source, notifier, TokioSleeper, settings);

    monitor.run().await;
    Ok(())
}
