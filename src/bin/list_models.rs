use anyhow::Result;
use clap::Parser;
use docchat::{config, lister};

#[derive(Parser)]
#[command(
    name = "list-models",
    about = "Print remote models that support content generation"
)]
struct Cli {
    /// Credential override; defaults to GOOGLE_API_KEY from the environment.
    #[arg(long)]
    api_key: Option<String>,
    /// Service base URL override, mainly useful against a test double.
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    let config = config::get_config();

    let api_key = cli.api_key.or_else(|| config.genai_api_key.clone());
    let base_url = cli
        .base_url
        .unwrap_or_else(|| config.genai_base_url.clone());

    let mut stdout = std::io::stdout().lock();
    lister::run_listing(api_key.as_deref(), &base_url, &mut stdout).await?;
    Ok(())
}
