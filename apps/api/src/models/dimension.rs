use std::fmt;

use serde::{Deserialize, Serialize};

use crate::survey::text::match_key;

/// The five TEAMS dimensions. Declaration order is the canonical report order:
/// it drives table rows, chart axes and prompt serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "Trust")]
    Trust,
    #[serde(rename = "Empathy")]
    Empathy,
    #[serde(rename = "Alignment")]
    Alignment,
    #[serde(rename = "Meaning / Purpose")]
    MeaningPurpose,
    #[serde(rename = "Psychological Safety")]
    PsychologicalSafety,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Trust,
        Dimension::Empathy,
        Dimension::Alignment,
        Dimension::MeaningPurpose,
        Dimension::PsychologicalSafety,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Trust => "Trust",
            Dimension::Empathy => "Empathy",
            Dimension::Alignment => "Alignment",
            Dimension::MeaningPurpose => "Meaning / Purpose",
            Dimension::PsychologicalSafety => "Psychological Safety",
        }
    }

    /// Resolves free-form category text to a dimension.
    ///
    /// Matching ignores case, encoding noise and spacing around the slash, so
    /// "meaning/purpose" and "Meaning /  Purpose" both resolve.
    pub fn parse(raw: &str) -> Option<Dimension> {
        let wanted = slash_insensitive(&match_key(raw));
        Dimension::ALL
            .into_iter()
            .find(|d| slash_insensitive(&d.label().to_lowercase()) == wanted)
    }
}

fn slash_insensitive(key: &str) -> String {
    key.split('/')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("/")
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_labels() {
        for d in Dimension::ALL {
            assert_eq!(Dimension::parse(d.label()), Some(d));
        }
    }

    #[test]
    fn test_parse_is_case_and_slash_insensitive() {
        assert_eq!(
            Dimension::parse("meaning/purpose"),
            Some(Dimension::MeaningPurpose)
        );
        assert_eq!(
            Dimension::parse("  PSYCHOLOGICAL   safety "),
            Some(Dimension::PsychologicalSafety)
        );
        assert_eq!(Dimension::parse("\u{200B}Trust"), Some(Dimension::Trust));
    }

    #[test]
    fn test_parse_unknown_category() {
        assert_eq!(Dimension::parse("Innovation"), None);
        assert_eq!(Dimension::parse(""), None);
    }

    #[test]
    fn test_serde_uses_display_labels() {
        let json = serde_json::to_string(&Dimension::MeaningPurpose).unwrap();
        assert_eq!(json, "\"Meaning / Purpose\"");
        let back: Dimension = serde_json::from_str("\"Psychological Safety\"").unwrap();
        assert_eq!(back, Dimension::PsychologicalSafety);
    }

    #[test]
    fn test_ord_follows_canonical_order() {
        let mut shuffled = vec![
            Dimension::PsychologicalSafety,
            Dimension::Trust,
            Dimension::MeaningPurpose,
            Dimension::Alignment,
            Dimension::Empathy,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Dimension::ALL.to_vec());
    }
}
