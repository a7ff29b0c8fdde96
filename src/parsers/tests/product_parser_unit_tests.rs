use crate::config::SelectorConfig;
use crate::error::{ConfigError, ItemSkip};
use crate::parsers::product::{MAX_TITLE_CHARS, canonicalize};
use crate::parsers::{ProductParser, SelectorChain};
use crate::results::CandidateRecord;
use scraper::{Html, Selector};
use url::Url;

fn origin() -> Url {
    Url::parse("https://www.mercadolivre.com.br").unwrap()
}

/// Wrap item markup in the default results container and extract the single item
fn extract_one(item_html: &str) -> Result<CandidateRecord, ItemSkip> {
    let parser = ProductParser::new(&SelectorConfig::default(), origin()).unwrap();
    let html = format!(
        r#"<html><body><ol class="ui-search-layout">
        <li class="ui-search-layout__item">{item_html}</li>
        </ol></body></html>"#
    );
    let mut outcomes = parser.extract_batch(&html);
    assert_eq!(outcomes.len(), 1);
    outcomes.remove(0)
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_chain_first_non_empty_wins() {
        let chain = SelectorChain::new(&[
            ".missing".to_string(),
            ".empty".to_string(),
            ".title".to_string(),
            "h2".to_string(),
        ])
        .unwrap();
        assert_eq!(chain.len(), 4);

        let doc = Html::parse_fragment(
            r#"<div id="item"><span class="empty">   </span><span class="title"> First
            Title </span><h2>Heading</h2></div>"#,
        );
        let item = doc
            .select(&Selector::parse("#item").unwrap())
            .next()
            .unwrap();
        assert_eq!(chain.first_text(item), Some("First Title".to_string()));
    }

    #[test]
    fn test_chain_rejects_invalid_selector() {
        let err = SelectorChain::new(&["h2".to_string(), "div:nth-child(".to_string()]).unwrap_err();
        match err {
            ConfigError::Selector { selector, .. } => assert_eq!(selector, "div:nth-child("),
            other => panic!("expected a selector error, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_rejects_invalid_price_selector() {
        let selectors = SelectorConfig {
            price_fraction: ">>".to_string(),
            ..SelectorConfig::default()
        };
        let err = ProductParser::new(&selectors, origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Selector { .. }));
    }

    #[test]
    fn test_generic_heading_fallback_for_title() {
        let candidate = extract_one(r#"<h2><a href="/p/1">Fallback title</a></h2>"#).unwrap();
        assert_eq!(candidate.title.as_deref(), Some("Fallback title"));
        assert_eq!(
            candidate.permalink.as_deref(),
            Some("https://www.mercadolivre.com.br/p/1")
        );
    }

    #[test]
    fn test_title_is_truncated() {
        let long = "x".repeat(MAX_TITLE_CHARS + 50);
        let candidate =
            extract_one(&format!(r#"<a class="poly-component__title" href="/p">{long}</a>"#))
                .unwrap();
        assert_eq!(candidate.title.unwrap().chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_price_without_integer_part_is_zero() {
        let candidate = extract_one(
            r#"<a class="poly-component__title" href="/p">Item</a>
            <div class="poly-price__current"><span class="andes-money-amount__cents">99</span></div>"#,
        )
        .unwrap();
        assert_eq!(candidate.price, 0.0);
    }

    #[test]
    fn test_cents_never_taken_from_previous_price() {
        let candidate = extract_one(
            r#"<a class="poly-component__title" href="/p">Item</a>
            <s class="andes-money-amount andes-money-amount--previous">
                <span class="andes-money-amount__fraction">4.999</span>
                <span class="andes-money-amount__cents">99</span>
            </s>
            <div class="poly-price__current">
                <span class="andes-money-amount__fraction">3.649</span>
            </div>"#,
        )
        .unwrap();
        assert_eq!(candidate.price, 3649.0);
    }

    #[test]
    fn test_generic_price_tier_skips_previous_price() {
        let candidate = extract_one(
            r#"<a class="poly-component__title" href="/p">Item</a>
            <s class="andes-money-amount andes-money-amount--previous">
                <span class="andes-money-amount__fraction">199</span>
                <span class="andes-money-amount__cents">90</span>
            </s>
            <span class="andes-money-amount">
                <span class="andes-money-amount__fraction">1.299</span>
                <span class="andes-money-amount__cents">50</span>
            </span>"#,
        )
        .unwrap();
        assert_eq!(candidate.price, 1299.5);
    }

    #[test]
    fn test_empty_current_price_falls_back_to_next_tier() {
        let candidate = extract_one(
            r#"<a class="poly-component__title" href="/p">Item</a>
            <div class="poly-price__current"></div>
            <div class="ui-search-price__second-line">
                <span class="andes-money-amount__fraction">89</span>
            </div>"#,
        )
        .unwrap();
        assert_eq!(candidate.price, 89.0);
    }

    #[test]
    fn test_sponsored_marker_on_item_itself() {
        let parser = ProductParser::new(&SelectorConfig::default(), origin()).unwrap();
        let html = r#"<ol class="ui-search-layout">
            <li class="ui-search-layout__item ui-search-layout__item--ad">
                <a class="poly-component__title" href="/p">Ad</a>
            </li></ol>"#;
        assert_eq!(parser.extract_batch(html), vec![Err(ItemSkip::Sponsored)]);
    }

    #[test]
    fn test_thumbnail_falls_back_to_generic_image() {
        let candidate = extract_one(
            r#"<a class="poly-component__title" href="/p">Item</a>
            <img class="other" src="//http2.mlstatic.com/thumb.jpg">"#,
        )
        .unwrap();
        assert_eq!(
            candidate.thumbnail.as_deref(),
            Some("https://http2.mlstatic.com/thumb.jpg")
        );
    }

    #[test]
    fn test_placeholder_only_thumbnail_is_missing() {
        let candidate = extract_one(
            r#"<img class="poly-component__picture" src="data:image/gif;base64,AAAA">"#,
        )
        .unwrap();
        assert_eq!(candidate.thumbnail, None);
    }

    #[test]
    fn test_unresolvable_permalink_skips_item() {
        let result = extract_one(r#"<a class="poly-component__title" href="http://[::1">Broken</a>"#);
        assert!(matches!(result, Err(ItemSkip::Malformed(_))));
    }

    #[test]
    fn test_script_permalink_falls_through_to_next_locator() {
        let candidate = extract_one(
            r#"<a class="poly-component__title" href="javascript:void(0)">Item</a>
            <h2><a href="/p/MLB-7">Item</a></h2>"#,
        )
        .unwrap();
        assert_eq!(
            candidate.permalink.as_deref(),
            Some("https://www.mercadolivre.com.br/p/MLB-7")
        );
    }

    #[test]
    fn test_only_script_permalinks_leave_permalink_missing() {
        let candidate = extract_one(
            r#"<a class="poly-component__title" href="javascript:void(0)">Item</a>"#,
        )
        .unwrap();
        assert_eq!(candidate.permalink, None);
    }

    #[test]
    fn test_canonicalize() {
        let origin = origin();
        assert_eq!(
            canonicalize(&origin, "/item/123").as_deref(),
            Some("https://www.mercadolivre.com.br/item/123")
        );
        assert_eq!(
            canonicalize(&origin, "https://produto.mercadolivre.com.br/MLB-1").as_deref(),
            Some("https://produto.mercadolivre.com.br/MLB-1")
        );
        assert_eq!(canonicalize(&origin, "  "), None);
    }
}
