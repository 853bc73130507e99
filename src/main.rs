use anyhow::{bail, Context};
use dlmate::storage::config;
use dlmate::{DlMate, Platform};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: dlmate [platform] <url>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dlmate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (platform, url) = match args.as_slice() {
        [url] => (None, url.as_str()),
        [platform, url] => (Some(platform.parse::<Platform>()?), url.as_str()),
        _ => bail!(USAGE),
    };

    let dl = DlMate::new(config::load_from_env());

    let result = match platform {
        Some(platform) => dl.extract(platform, url).await,
        None => dl.extract_auto(url).await,
    }
    .with_context(|| format!("extraction failed for {}", url))?;

    println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    Ok(())
}
