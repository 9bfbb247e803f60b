//! Declarative extraction rules
//!
//! Each field is described by an ordered list of candidates. The extractor
//! walks the list in order and keeps the first candidate that yields a
//! non-empty value, so changing markup support means editing these tables,
//! not the extraction code.

/// Where a matched element's value is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Trimmed text content of the element
    Text,
    /// Trimmed value of the named attribute
    Attribute(String),
}

/// A single text candidate: a CSS selector plus where to read the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    pub selector: String,
    pub source: ValueSource,
}

impl TextRule {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            source: ValueSource::Text,
        }
    }

    pub fn attribute(selector: &str, attribute: &str) -> Self {
        Self {
            selector: selector.to_string(),
            source: ValueSource::Attribute(attribute.to_string()),
        }
    }
}

/// A tag container and the items inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    /// Selector for the container; only the first match is used
    pub container: String,
    /// Selector for the items, evaluated inside the container
    pub item: String,
}

impl TagRule {
    pub fn new(container: &str, item: &str) -> Self {
        Self {
            container: container.to_string(),
            item: item.to_string(),
        }
    }
}

/// One markup convention for listing images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRule {
    pub selector: String,
    /// Attributes tried in order; full-resolution attributes come before `src`
    pub attributes: Vec<String>,
}

impl ImageRule {
    pub fn new(selector: &str, attributes: &[&str]) -> Self {
        Self {
            selector: selector.to_string(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// The complete rule set for a product page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRules {
    pub title: Vec<TextRule>,
    pub price: Vec<TextRule>,
    /// Selectors for embedded structured-data scripts
    pub structured_data: Vec<String>,
    pub tags: Vec<TagRule>,
    pub images: Vec<ImageRule>,
    /// Unique image URLs kept per listing
    pub max_images: usize,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            title: vec![TextRule::text("h1[data-buy-box-listing-title='true']")],
            price: vec![
                TextRule::text("p.wt-text-title-larger"),
                TextRule::text("div[data-buy-box-region='price'] p.wt-text-title-03"),
                TextRule::text("p.wt-text-title-03"),
                TextRule::attribute("meta[property='product:price:amount']", "content"),
            ],
            structured_data: vec!["script[type='application/ld+json']".to_string()],
            tags: vec![
                TagRule::new("div.tags-section-container", "a"),
                TagRule::new("ul.wt-action-group", "li.wt-action-group__item-container"),
                TagRule::new("body", "li.wt-action-group__item-container"),
            ],
            images: vec![
                ImageRule::new("img.carousel-image", &["data-src-zoom-image", "src"]),
                ImageRule::new(
                    "li.carousel-pagination-item-v2 img",
                    &["data-src-zoom-image", "data-src-delay", "src"],
                ),
                ImageRule::new(
                    "div.listing-page-image-carousel-component img",
                    &["data-src-zoom-image", "data-src", "src"],
                ),
            ],
            max_images: crate::product::PHOTO_SLOTS,
        }
    }
}
