//! Visual-insight sentence cleanup. There is no parsing contract beyond this.

const QUOTE_PAIRS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('\u{201C}', '\u{201D}'), ('\u{2018}', '\u{2019}')];

/// Trims the model's answer and removes one layer of surrounding quotes.
pub fn clean_insight(raw: &str) -> String {
    let text = raw.trim();
    for (open, close) in QUOTE_PAIRS {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim().to_string();
        }
    }
    text.to_string()
}
