use clap::Parser;
use yield_products::ScraperConfig;
use yield_products::config::Environment;

#[derive(Parser, Debug)]
#[command(name = "yield-products")]
#[command(about = "Extracts product listings from rendered search-results pages")]
#[command(version)]
pub struct Args {
    /// JSON configuration file (defaults apply to every missing field)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address the HTTP server listens on
    #[arg(short, long)]
    pub listen: Option<String>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Hide internal error details from HTTP responses
    #[arg(long)]
    pub production: bool,

    /// Run one search, print the records as JSON and exit instead of serving
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Load the configuration file (if any), then apply environment and CLI overrides
pub fn load_config(args: &Args) -> Result<ScraperConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::default(),
    };
    config.apply_env();

    if let Some(listen) = &args.listen {
        config.listen_addr = listen.clone();
    }
    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = url.clone();
    }
    if args.production {
        config.environment = Environment::Production;
    }
    Ok(config)
}
