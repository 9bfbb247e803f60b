use crate::ExtractionError;
use regex::Regex;

/// Grouped thousands, a bare fraction, or digits with an optional decimal part
const AMOUNT: &str = r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d*\.\d+|\d+(?:[.,]\d+)?";

/// Pulls the numeric amount out of a displayed price
///
/// An amount next to a currency marker (`CA$ 24.50`, `USD 18`, `24,50 €`)
/// wins over any other number in the text. A bare number is used only when
/// the text carries no marker at all.
#[derive(Debug, Clone)]
pub struct PriceParser {
    marked: Regex,
    bare: Regex,
}

impl PriceParser {
    pub fn new() -> Result<Self, ExtractionError> {
        let marked = format!(
            r"(?:[A-Z]{{1,3}}\s*)?[$€£¥]\s*({amount})|\b[A-Z]{{3}}\s*({amount})|({amount})\s*(?:[$€£¥]|\b[A-Z]{{3}}\b)",
            amount = AMOUNT
        );
        let bare = format!(r"({})", AMOUNT);

        Ok(Self {
            marked: compile(&marked)?,
            bare: compile(&bare)?,
        })
    }

    /// Returns the amount without currency symbol, code or thousands separators
    ///
    /// A decimal comma becomes a dot and a bare fraction gains a leading zero.
    /// Text without an amount yields an empty string.
    pub fn parse(&self, text: &str) -> String {
        let text = text.trim();
        let amount = match self.marked.captures(text) {
            Some(caps) => (1..=3).find_map(|i| caps.get(i)),
            None if self.has_marker(text) => None,
            None => self.bare.captures(text).and_then(|caps| caps.get(1)),
        };

        amount
            .map(|m| normalize_amount(m.as_str()))
            .unwrap_or_default()
    }

    fn has_marker(&self, text: &str) -> bool {
        text.contains(|c: char| matches!(c, '$' | '€' | '£' | '¥'))
    }
}

fn compile(pattern: &str) -> Result<Regex, ExtractionError> {
    Regex::new(pattern).map_err(|e| ExtractionError::InvalidPattern(e.to_string()))
}

fn normalize_amount(raw: &str) -> String {
    let amount = match raw.rfind(',') {
        // "24,50": a comma not followed by a thousands group is a decimal comma
        Some(pos) if !raw.contains('.') && raw.len() - pos - 1 != 3 => raw.replace(',', "."),
        _ => raw.replace(',', ""),
    };

    if amount.starts_with('.') {
        format!("0{}", amount)
    } else {
        amount
    }
}
