//! Field extraction from a parsed product page
//!
//! Every field is extracted independently from the same document. A field
//! whose rules all miss resolves to an empty value; nothing here aborts the
//! record.

use crate::extract::price::PriceParser;
use crate::extract::rules::{ExtractionRules, TextRule, ValueSource};
use crate::extract::structured::description_from_ld_json;
use crate::ExtractionError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Raw field values pulled from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub price: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Unique image URLs in first-seen order, already truncated
    pub images: Vec<String>,
}

struct CompiledText {
    selector: Selector,
    source: ValueSource,
}

struct CompiledTags {
    container: Selector,
    item: Selector,
}

struct CompiledImages {
    selector: Selector,
    attributes: Vec<String>,
}

/// Applies an `ExtractionRules` table to product pages
///
/// Selectors are compiled once at construction; the extractor keeps no state
/// between pages.
pub struct FieldExtractor {
    title: Vec<CompiledText>,
    price: Vec<CompiledText>,
    structured_data: Vec<Selector>,
    tags: Vec<CompiledTags>,
    images: Vec<CompiledImages>,
    max_images: usize,
    price_parser: PriceParser,
}

impl FieldExtractor {
    /// Creates an extractor for the built-in rule table
    pub fn new() -> Result<Self, ExtractionError> {
        Self::with_rules(&ExtractionRules::default())
    }

    /// Creates an extractor for a custom rule table
    ///
    /// # Returns
    ///
    /// * `Ok(FieldExtractor)` - Every selector compiled
    /// * `Err(ExtractionError::InvalidSelector)` - A selector failed to parse
    pub fn with_rules(rules: &ExtractionRules) -> Result<Self, ExtractionError> {
        let tags = rules
            .tags
            .iter()
            .map(|rule| -> Result<CompiledTags, ExtractionError> {
                Ok(CompiledTags {
                    container: compile_selector(&rule.container)?,
                    item: compile_selector(&rule.item)?,
                })
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        let images = rules
            .images
            .iter()
            .map(|rule| -> Result<CompiledImages, ExtractionError> {
                Ok(CompiledImages {
                    selector: compile_selector(&rule.selector)?,
                    attributes: rule.attributes.clone(),
                })
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        let structured_data = rules
            .structured_data
            .iter()
            .map(|s| compile_selector(s))
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        Ok(Self {
            title: compile_text_rules(&rules.title)?,
            price: compile_text_rules(&rules.price)?,
            structured_data,
            tags,
            images,
            max_images: rules.max_images,
            price_parser: PriceParser::new()?,
        })
    }

    /// Extracts every field from raw page HTML
    ///
    /// # Arguments
    ///
    /// * `html` - The page body
    /// * `page_url` - The page URL, used to resolve relative image URLs
    pub fn extract(&self, html: &str, page_url: &str) -> ExtractedFields {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        ExtractedFields {
            title: self.extract_title(&document),
            price: self.extract_price(&document),
            description: self.extract_description(&document),
            tags: self.extract_tags(&document),
            images: self.extract_images(&document, base.as_ref()),
        }
    }

    pub fn extract_title(&self, document: &Html) -> String {
        first_non_empty(document, &self.title, |value| value.to_string())
    }

    /// First candidate whose text carries an amount wins
    pub fn extract_price(&self, document: &Html) -> String {
        first_non_empty(document, &self.price, |value| self.price_parser.parse(value))
    }

    pub fn extract_description(&self, document: &Html) -> String {
        for selector in &self.structured_data {
            for script in document.select(selector) {
                let raw: String = script.text().collect();
                match description_from_ld_json(&raw) {
                    Ok(Some(description)) => return description,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::debug!("Skipping structured data block: {}", e);
                    }
                }
            }
        }
        String::new()
    }

    pub fn extract_tags(&self, document: &Html) -> Vec<String> {
        for rule in &self.tags {
            let Some(container) = document.select(&rule.container).next() else {
                continue;
            };

            let tags: Vec<String> = container
                .select(&rule.item)
                .map(|item| element_text(&item))
                .filter(|tag| !tag.is_empty())
                .collect();

            if !tags.is_empty() {
                return tags;
            }
        }
        Vec::new()
    }

    /// Collects unique image URLs across every rule, in first-seen order
    pub fn extract_images(&self, document: &Html, base: Option<&Url>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut images = Vec::new();

        for rule in &self.images {
            for element in document.select(&rule.selector) {
                if images.len() >= self.max_images {
                    return images;
                }

                let Some(url) = rule
                    .attributes
                    .iter()
                    .filter_map(|attr| element.value().attr(attr))
                    .find_map(|raw| normalize_image_url(raw, base))
                else {
                    continue;
                };

                if seen.insert(url.clone()) {
                    images.push(url);
                }
            }
        }

        images
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|_| ExtractionError::InvalidSelector(selector.to_string()))
}

fn compile_text_rules(rules: &[TextRule]) -> Result<Vec<CompiledText>, ExtractionError> {
    rules
        .iter()
        .map(|rule| -> Result<CompiledText, ExtractionError> {
            Ok(CompiledText {
                selector: compile_selector(&rule.selector)?,
                source: rule.source.clone(),
            })
        })
        .collect()
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Walks text rules in order, returning the first non-empty mapped value
fn first_non_empty<F>(document: &Html, rules: &[CompiledText], map: F) -> String
where
    F: Fn(&str) -> String,
{
    for rule in rules {
        let Some(element) = document.select(&rule.selector).next() else {
            continue;
        };

        let raw = match &rule.source {
            ValueSource::Text => element_text(&element),
            ValueSource::Attribute(name) => element
                .value()
                .attr(name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
        };

        let value = map(&raw);
        if !value.is_empty() {
            return value;
        }
    }
    String::new()
}

/// Normalizes an image reference to an absolute `https://` URL
///
/// Absolute URLs keep their exact text apart from the scheme upgrade;
/// relative and protocol-relative references are resolved against the page.
/// Empty values and `data:` URIs are dropped.
pub fn normalize_image_url(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }

    let absolute = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        let resolved = base?.join(raw).ok()?;
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            return None;
        }
        resolved.to_string()
    };

    match absolute.strip_prefix("http://") {
        Some(rest) => Some(format!("https://{}", rest)),
        None => Some(absolute),
    }
}
