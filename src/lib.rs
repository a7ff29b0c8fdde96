pub mod config;
pub mod error;
pub mod overlay;
pub mod parsers;
pub mod pipeline;
pub mod readiness;
pub mod results;
pub mod server;
pub mod session;
pub mod utils;
pub mod validate;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use error::{PipelineError, SessionError};
pub use pipeline::Pipeline;
pub use results::{ExtractionBatch, ProductRecord, SearchRequest};
pub use session::webdriver::WebDriverFactory;

/// Run a single search through a WebDriver-controlled browser
pub async fn search(
    config: ScraperConfig,
    query: &str,
) -> Result<ExtractionBatch, Box<dyn std::error::Error>> {
    let request = SearchRequest::new(query)?;
    let factory = WebDriverFactory::new(config.webdriver_url.clone());
    let pipeline = Pipeline::new(factory, config)?;
    Ok(pipeline.run(&request).await?)
}
