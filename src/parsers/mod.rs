pub mod price;
pub mod product;

#[cfg(test)]
mod tests;

use crate::error::ConfigError;
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Selector};

pub use product::ProductParser;

/// Compile a single CSS selector
pub fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Ordered list of alternative locators for one logical field
///
/// Evaluated short-circuit: the first locator yielding a usable value wins.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    pub fn new(selectors: &[String]) -> Result<Self, ConfigError> {
        let selectors = selectors
            .iter()
            .map(|s| compile(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// First non-empty, whitespace-collapsed text found under `node`
    pub fn first_text(&self, node: ElementRef<'_>) -> Option<String> {
        self.first_value(node, |el| {
            let text = collapse_whitespace(&el.text().collect::<String>());
            (!text.is_empty()).then_some(text)
        })
    }

    /// First element matched by any locator, in chain order, that passes `accept`
    pub fn first_match<'a, F>(&self, node: ElementRef<'a>, mut accept: F) -> Option<ElementRef<'a>>
    where
        F: FnMut(ElementRef<'a>) -> bool,
    {
        self.selectors
            .iter()
            .filter_map(|selector| node.select(selector).next())
            .find(|el| accept(*el))
    }

    /// Apply `resolve` to the first element each locator matches, in order
    pub fn first_value<F>(&self, node: ElementRef<'_>, mut resolve: F) -> Option<String>
    where
        F: FnMut(ElementRef<'_>) -> Option<String>,
    {
        self.selectors
            .iter()
            .filter_map(|selector| node.select(selector).next())
            .find_map(|el| resolve(el))
    }
}
