use crate::config::SelectorConfig;
use crate::error::{ConfigError, ItemSkip};
use crate::parsers::price::compose_price;
use crate::parsers::{SelectorChain, compile};
use crate::results::CandidateRecord;
use crate::utils::{collapse_whitespace, truncate_chars};
use crate::validate::is_web_url;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Titles longer than this are truncated before emission
pub const MAX_TITLE_CHARS: usize = 200;

/// Resolves product fields from rendered search-results markup
///
/// Compiled once from the selector configuration and shared by all requests.
#[derive(Debug, Clone)]
pub struct ProductParser {
    container: Selector,
    item: Selector,
    sponsored: Vec<Selector>,
    title: SelectorChain,
    price: SelectorChain,
    price_integer: Selector,
    price_fraction: Selector,
    permalink: SelectorChain,
    thumbnail: SelectorChain,
    thumbnail_attributes: Vec<String>,
    origin: Url,
}

impl ProductParser {
    pub fn new(selectors: &SelectorConfig, origin: Url) -> Result<Self, ConfigError> {
        Ok(Self {
            container: compile(&selectors.container)?,
            item: compile(&selectors.item)?,
            sponsored: selectors
                .sponsored
                .iter()
                .map(|s| compile(s))
                .collect::<Result<_, _>>()?,
            title: SelectorChain::new(&selectors.title)?,
            price: SelectorChain::new(&selectors.price)?,
            price_integer: compile(&selectors.price_integer)?,
            price_fraction: compile(&selectors.price_fraction)?,
            permalink: SelectorChain::new(&selectors.permalink)?,
            thumbnail: SelectorChain::new(&selectors.thumbnail)?,
            thumbnail_attributes: selectors.thumbnail_attributes.clone(),
            origin,
        })
    }

    /// Extract a candidate (or a skip reason) for every item node, in page order
    pub fn extract_batch(&self, markup: &str) -> Vec<Result<CandidateRecord, ItemSkip>> {
        let doc = Html::parse_document(markup);
        let outcomes: Vec<_> = doc
            .select(&self.container)
            .flat_map(|container| container.select(&self.item))
            .map(|item| self.extract_item(item))
            .collect();

        ::log::debug!("Extracted {} item nodes", outcomes.len());
        outcomes
    }

    /// Resolve every field of one item node
    pub fn extract_item(&self, item: ElementRef<'_>) -> Result<CandidateRecord, ItemSkip> {
        if self.is_sponsored(item) {
            return Err(ItemSkip::Sponsored);
        }

        let title = self
            .title
            .first_text(item)
            .map(|t| truncate_chars(&t, MAX_TITLE_CHARS));

        let price = self.resolve_price(item);
        let permalink = self.resolve_permalink(item)?;

        let thumbnail = self.resolve_thumbnail(item);

        Ok(CandidateRecord {
            title,
            price,
            permalink,
            thumbnail,
        })
    }

    fn is_sponsored(&self, item: ElementRef<'_>) -> bool {
        self.sponsored
            .iter()
            .any(|marker| marker.matches(&item) || item.select(marker).next().is_some())
    }

    // Both parts come from one price element so a previous price never lends its cents
    fn resolve_price(&self, item: ElementRef<'_>) -> f64 {
        let Some(amount) = self
            .price
            .first_match(item, |el| part_text(el, &self.price_integer).is_some())
        else {
            return 0.0;
        };
        let integer = part_text(amount, &self.price_integer);
        let fraction = part_text(amount, &self.price_fraction);
        compose_price(integer.as_deref(), fraction.as_deref())
    }

    // Script and mail anchors fall through to the next locator
    fn resolve_permalink(&self, item: ElementRef<'_>) -> Result<Option<String>, ItemSkip> {
        let mut malformed: Option<String> = None;
        let resolved = self.permalink.first_value(item, |anchor| {
            let href = anchor.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            match self.canonicalize(href) {
                Some(link) if is_web_url(&link) => Some(link),
                Some(link) => {
                    ::log::debug!("Ignoring non-web permalink `{}`", link);
                    None
                }
                None => {
                    malformed.get_or_insert_with(|| href.to_string());
                    None
                }
            }
        });

        match (resolved, malformed) {
            (Some(link), _) => Ok(Some(link)),
            (None, Some(href)) => Err(ItemSkip::Malformed(format!(
                "unresolvable permalink `{href}`"
            ))),
            (None, None) => Ok(None),
        }
    }

    // Deferred-load attributes come before `src`, which often holds a placeholder
    fn resolve_thumbnail(&self, item: ElementRef<'_>) -> Option<String> {
        self.thumbnail.first_value(item, |img| {
            self.thumbnail_attributes
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .map(str::trim)
                .filter(|value| !value.is_empty() && !value.starts_with("data:"))
                .find_map(|value| self.canonicalize(value))
        })
    }

    /// Absolute links pass through unchanged; relative ones are joined onto the site origin
    pub fn canonicalize(&self, link: &str) -> Option<String> {
        canonicalize(&self.origin, link)
    }
}

fn part_text(amount: ElementRef<'_>, part: &Selector) -> Option<String> {
    amount
        .select(part)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// Rewrite a relative link into an absolute URL on `origin`
pub fn canonicalize(origin: &Url, link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    match Url::parse(link) {
        Ok(_) => Some(link.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            origin.join(link).ok().map(|url| url.to_string())
        }
        Err(e) => {
            ::log::debug!("Discarding malformed link `{}`: {}", link, e);
            None
        }
    }
}
