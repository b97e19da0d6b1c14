//! Marketplace result-page parsers.
//!
//! Each parser walks the listing cards of one marketplace and returns
//! `(title, price)` candidates. Cards without a usable title or price, or
//! priced outside the phone band, are dropped here.

use std::sync::LazyLock;

use phonespec_shared::ListingCandidate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::marketplace::Marketplace;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("selector {css}: {e}"))
}

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter().map(|css| selector(css)).collect()
}

// OLX
static OLX_CARD: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"section[data-ds-component="DS-AdCard"], section.olx-ad-card, section[class*="ad"]"#)
});
static OLX_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"h2, [class*="title"], a[data-lurker]"#));
static OLX_PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"h3, [class*="price"], span[class*="price"]"#));
static OLX_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R\$\s*([\d.]+)").expect("valid regex"));

// Amazon
static AMAZON_CARD: LazyLock<Selector> = LazyLock::new(|| {
    selector(
        r#"[data-component-type="s-search-result"], .s-result-item[data-asin], div[data-asin]:not([data-asin=""]), .s-card-container"#,
    )
});
static AMAZON_TITLES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "h2 a.a-link-normal span",
        "h2 span.a-text-normal",
        "h2 a span",
        ".a-size-base-plus",
        ".a-size-medium",
    ])
});
static AMAZON_PRICES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        ".a-price .a-offscreen",
        ".a-price-whole",
        r#"span.a-price span[aria-hidden="true"]"#,
        ".a-price > span:first-child",
        r#"span[data-a-color="price"]"#,
    ])
});
static AMAZON_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R?\$?\s*([\d.]+)(?:,\d+)?").expect("valid regex"));
static TRAILING_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*-?\s*\b(preto|branco|azul|vermelho|verde|amarelo|rosa|roxo|dourado|prateado|grafite|meia-noite|estelar|alpino|sierra|intenso|natural|titânio|deserto|areias?|midnight|starlight|alpine|blue|green|red|yellow|pink|purple|gold|silver|graphite|black|white|titanium|desert)\s*$",
    )
    .expect("valid regex")
});

// Mercado Livre
static ML_CARD: LazyLock<Selector> =
    LazyLock::new(|| selector("li.ui-search-layout__item, div.ui-search-result__wrapper"));
static ML_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector("h2.ui-search-item__title, a.ui-search-link"));
static ML_PRICE: LazyLock<Selector> = LazyLock::new(|| {
    selector("span.andes-money-amount__fraction, span.price-tag-fraction")
});

/// Parse a results page from `marketplace` into listing candidates.
pub fn parse_listings(marketplace: Marketplace, html: &str) -> Vec<ListingCandidate> {
    let doc = Html::parse_document(html);
    let candidates = match marketplace {
        Marketplace::Olx => parse_olx(&doc),
        Marketplace::Amazon => parse_amazon(&doc),
        Marketplace::MercadoLivre => parse_mercadolivre(&doc),
    };
    debug!(%marketplace, candidates = candidates.len(), "listings parsed");
    candidates
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text of the first element under `card` matching `sel`.
fn first_text(card: ElementRef<'_>, sel: &Selector) -> Option<String> {
    card.select(sel).next().map(text_of)
}

/// Text of the first non-empty match, trying `sels` in order.
fn first_non_empty(card: ElementRef<'_>, sels: &[Selector]) -> Option<String> {
    sels.iter()
        .filter_map(|sel| card.select(sel).next())
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// "5.999" → 5999.
fn parse_thousands(digits: &str) -> Option<u32> {
    digits.replace('.', "").parse().ok()
}

/// Price in whole reais from Brazilian-formatted text, via `re` group 1.
fn price_from(re: &Regex, text: &str) -> Option<u32> {
    let caps = re.captures(text)?;
    parse_thousands(&caps[1])
}

fn parse_olx(doc: &Html) -> Vec<ListingCandidate> {
    doc.select(&OLX_CARD)
        .filter_map(|card| {
            let title = first_text(card, &OLX_TITLE)?;
            let price = price_from(&OLX_PRICE_RE, &first_text(card, &OLX_PRICE)?)?;
            ListingCandidate::new(title, price)
        })
        .collect()
}

/// Drop one trailing color word ("iPhone 15 128GB Preto" → "iPhone 15 128GB").
pub fn strip_trailing_color(title: &str) -> String {
    TRAILING_COLOR_RE.replace(title, "").trim().to_string()
}

fn parse_amazon(doc: &Html) -> Vec<ListingCandidate> {
    doc.select(&AMAZON_CARD)
        .filter(|card| {
            card.value()
                .attr("data-asin")
                .is_some_and(|asin| !asin.trim().is_empty())
        })
        .filter_map(|card| {
            let title = first_non_empty(card, &AMAZON_TITLES)?;
            let price = price_from(&AMAZON_PRICE_RE, &first_non_empty(card, &AMAZON_PRICES)?)?;
            ListingCandidate::new(strip_trailing_color(&title), price)
        })
        .collect()
}

fn parse_mercadolivre(doc: &Html) -> Vec<ListingCandidate> {
    doc.select(&ML_CARD)
        .filter_map(|card| {
            let title = first_text(card, &ML_TITLE)?;
            let digits: String = first_text(card, &ML_PRICE)?
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            ListingCandidate::new(title, digits.parse().ok()?)
        })
        .collect()
}
