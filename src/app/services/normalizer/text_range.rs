//! Keyword-anchored numeric range extraction from forecast prose

use regex::Regex;

/// Dash and tilde glyphs accepted between the two bounds of a range
const RANGE_SEPARATORS: &str = r"[～~—\-]";
const NUMBER: &str = r"(\d+(?:\.\d+)?)";
/// The search never crosses a sentence or clause terminator
const SAME_CLAUSE: &str = r"[^。；;]*?";

/// Compiled patterns for one keyword
#[derive(Debug, Clone)]
pub struct RangeExtractor {
    range: Option<Regex>,
    single: Option<Regex>,
}

impl RangeExtractor {
    pub fn new(keyword: &str) -> Self {
        let keyword = regex::escape(keyword);
        let range = format!(
            r"{keyword}{SAME_CLAUSE}{NUMBER}\s*{RANGE_SEPARATORS}\s*{NUMBER}"
        );
        let single = format!(r"{keyword}{SAME_CLAUSE}{NUMBER}");

        // A pattern that fails to compile simply never matches
        Self {
            range: Regex::new(&range).ok(),
            single: Regex::new(&single).ok(),
        }
    }

    /// `(low, high)` following the keyword
    ///
    /// A `a～b` range wins; otherwise a single number is both bounds;
    /// otherwise `(None, None)`. No plausibility checks are made.
    pub fn extract(&self, text: &str) -> (Option<f64>, Option<f64>) {
        if text.is_empty() {
            return (None, None);
        }

        if let Some(caps) = self.range.as_ref().and_then(|re| re.captures(text)) {
            let low = caps[1].parse::<f64>().ok();
            let high = caps[2].parse::<f64>().ok();
            return (low, high);
        }

        match self
            .single
            .as_ref()
            .and_then(|re| re.captures(text))
            .and_then(|caps| caps[1].parse::<f64>().ok())
        {
            Some(value) => (Some(value), Some(value)),
            None => (None, None),
        }
    }
}

/// One-shot convenience over [`RangeExtractor`]
pub fn extract_range(text: &str, keyword: &str) -> (Option<f64>, Option<f64>) {
    RangeExtractor::new(keyword).extract(text)
}
