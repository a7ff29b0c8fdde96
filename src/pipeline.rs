use crate::config::ScraperConfig;
use crate::error::{ConfigError, PipelineError};
use crate::overlay::{OverlayCatalog, dismiss_overlays};
use crate::parsers::ProductParser;
use crate::readiness;
use crate::results::{ExtractionBatch, SearchRequest};
use crate::session::{PageSession, SessionFactory};
use crate::validate::validate_batch;
use tokio::time::timeout;
use url::Url;

/// Overlays can appear after first paint, so dismissal always runs at least this often
const MIN_DISMISS_PASSES: u32 = 2;

/// Runs one search end to end: navigate, dismiss overlays, wait for results, extract
///
/// Built once at startup and shared by all requests. Each run opens its own
/// page session and releases it on every exit path.
pub struct Pipeline<F: SessionFactory> {
    factory: F,
    config: ScraperConfig,
    catalog: OverlayCatalog,
    parser: ProductParser,
}

impl<F: SessionFactory> Pipeline<F> {
    pub fn new(factory: F, config: ScraperConfig) -> Result<Self, ConfigError> {
        let origin = config
            .site
            .origin_url()
            .map_err(|_| ConfigError::InvalidOrigin(config.site.origin.clone()))?;
        let parser = ProductParser::new(&config.selectors, origin)?;
        let catalog = config.overlay_catalog()?;
        ::log::info!(
            "Loaded overlay catalog v{} with {} rules",
            catalog.version(),
            catalog.rules().len()
        );

        Ok(Self {
            factory,
            config,
            catalog,
            parser,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Execute the search and return the validated batch
    pub async fn run(&self, request: &SearchRequest) -> Result<ExtractionBatch, PipelineError> {
        let url = self
            .config
            .site
            .search_url(request.query())
            .map_err(|e| PipelineError::InvalidUrl(e.to_string()))?;
        ::log::info!("Searching for {:?} at {}", request.query(), url);

        let mut session = self.factory.open().await.map_err(PipelineError::Session)?;
        let outcome = self.drive(&mut session, &url).await;

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to release page session: {}", e);
        }

        match &outcome {
            Ok(batch) => ::log::info!(
                "Search {:?} finished: {} records from {} items ({} sponsored, {} incomplete, {} malformed)",
                request.query(),
                batch.records.len(),
                batch.items_seen,
                batch.skipped.sponsored,
                batch.skipped.incomplete,
                batch.skipped.malformed
            ),
            Err(e) => ::log::error!("Search {:?} failed: {}", request.query(), e),
        }
        outcome
    }

    async fn drive(
        &self,
        session: &mut F::Session,
        url: &Url,
    ) -> Result<ExtractionBatch, PipelineError> {
        let navigation_timeout = self.config.navigation_timeout();
        match timeout(navigation_timeout, session.navigate(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(PipelineError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(PipelineError::Navigation {
                    url: url.to_string(),
                    reason: format!("timed out after {} ms", navigation_timeout.as_millis()),
                });
            }
        }

        let dismissal = &self.config.dismissal;
        for pass in 0..dismissal.passes.max(MIN_DISMISS_PASSES) {
            if pass > 0 {
                tokio::time::sleep(dismissal.settle_delay()).await;
            }
            let dismissed = dismiss_overlays(session, &self.catalog, dismissal.click_pause()).await;
            ::log::debug!("Dismissal pass {} closed {} overlay(s)", pass + 1, dismissed);
        }

        let readiness =
            readiness::probe(session, &self.config.selectors, &self.config.readiness).await?;
        ::log::debug!(
            "Extracting after readiness attempt {} ({} items)",
            readiness.attempt,
            readiness.item_count
        );

        let markup = session
            .snapshot_markup()
            .await
            .map_err(PipelineError::Snapshot)?;

        Ok(validate_batch(self.parser.extract_batch(&markup)))
    }
}
