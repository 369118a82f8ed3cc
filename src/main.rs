#![windows_subsystem = "windows"]

#[cfg(windows)]
use tracing_subscriber::EnvFilter;

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting IP Notifier");

    ip_notifier_rs::app::run()
}

#[cfg(not(windows))]
fn main() {
    eprintln!("ip-notifier-rs only runs on Windows");
    std::process::exit(1);
}
