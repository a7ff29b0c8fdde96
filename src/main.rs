use clap::Parser;
use std::sync::Arc;
use yield_products::{Pipeline, WebDriverFactory, server};

mod args;
use args::{Args, load_config};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    if let Some(query) = &args.query {
        run_once(config, query).await;
        return;
    }

    println!("Note: searches require a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using {}",
        config.webdriver_url
    );

    let listen_addr = config.listen_addr.clone();
    let factory = WebDriverFactory::new(config.webdriver_url.clone());
    let pipeline = match Pipeline::new(factory, config) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = server::serve(pipeline, &listen_addr).await {
        ::log::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run_once(config: yield_products::ScraperConfig, query: &str) {
    let start_time = std::time::Instant::now();

    match yield_products::search(config, query).await {
        Ok(batch) => {
            ::log::info!(
                "Search complete - {} records ({} skipped) in {:.2} seconds",
                batch.records.len(),
                batch.skipped.total(),
                start_time.elapsed().as_secs_f64()
            );
            match serde_json::to_string_pretty(&batch.records) {
                Ok(json) => println!("{json}"),
                Err(e) => ::log::error!("Failed to serialize records: {}", e),
            }
        }
        Err(e) => {
            ::log::error!("Search failed: {}", e);
            std::process::exit(1);
        }
    }
}
