//! MBTI compatibility: static pair table with a trait-letter heuristic fallback.
//!
//! The resolver is total: absent or malformed codes resolve to `NEUTRAL_COMPATIBILITY`
//! instead of erroring. No psychometric validity is claimed for any of these numbers.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Score used whenever either side of a pair has no usable MBTI code.
pub const NEUTRAL_COMPATIBILITY: f64 = 0.75;

const HEURISTIC_BASE: f64 = 0.5;
const SAME_THINKING_FEELING_BONUS: f64 = 0.2;
const SAME_JUDGING_PERCEIVING_BONUS: f64 = 0.15;
const COMPLEMENTARY_ENERGY_BONUS: f64 = 0.1;

/// Letter alphabets for each of the four positions: E/I, S/N, T/F, J/P.
const ALPHABETS: [[u8; 2]; 4] = [*b"EI", *b"SN", *b"TF", *b"JP"];

/// A validated four-letter MBTI code, stored upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mbti([u8; 4]);

impl Mbti {
    /// Parses a code case-insensitively, ignoring surrounding whitespace.
    /// Returns `None` for anything that is not one of the 16 valid types.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != 4 {
            return None;
        }
        let mut letters = [0u8; 4];
        for (i, byte) in raw.bytes().enumerate() {
            let upper = byte.to_ascii_uppercase();
            if !ALPHABETS[i].contains(&upper) {
                return None;
            }
            letters[i] = upper;
        }
        Some(Self(letters))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters from ALPHABETS are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("")
    }

    fn energy(&self) -> u8 {
        self.0[0]
    }

    fn decision(&self) -> u8 {
        self.0[2]
    }

    fn lifestyle(&self) -> u8 {
        self.0[3]
    }
}

impl fmt::Display for Mbti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Mbti {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Mbti::parse(&value).ok_or_else(|| format!("'{value}' is not a valid MBTI type"))
    }
}

impl From<Mbti> for String {
    fn from(value: Mbti) -> Self {
        value.as_str().to_string()
    }
}

/// Known pairings. Each unordered pair appears at most once; lookups check both orders.
const PAIR_TABLE: &[(&str, &str, f64)] = &[
    ("ENFP", "INTJ", 0.9),
    ("ENFP", "INFJ", 0.9),
    ("ENTP", "INFJ", 0.9),
    ("ENTP", "INTJ", 0.85),
    ("ENTJ", "INTP", 0.85),
    ("ENTJ", "INFP", 0.85),
    ("ENFJ", "INFP", 0.9),
    ("ENFJ", "ISFP", 0.85),
    ("ESTJ", "ISTP", 0.8),
    ("ESTJ", "ISFJ", 0.8),
    ("ESFJ", "ISFP", 0.8),
    ("ESFJ", "ISTJ", 0.8),
    ("ESTP", "ISFJ", 0.8),
    ("ESFP", "ISTJ", 0.8),
    ("INTJ", "INTP", 0.8),
    ("INFJ", "INFP", 0.8),
    ("ENTJ", "ENTP", 0.75),
    ("ENFJ", "ENFP", 0.8),
    ("ESTJ", "ENTJ", 0.7),
    ("ISTJ", "INTJ", 0.75),
    ("ESTJ", "INFP", 0.5),
    ("ISTJ", "ENFP", 0.55),
    ("ESFJ", "INTP", 0.55),
    ("ISFJ", "ENTP", 0.55),
];

static COMPATIBILITY_TABLE: LazyLock<HashMap<(&'static str, &'static str), f64>> =
    LazyLock::new(|| PAIR_TABLE.iter().map(|&(a, b, s)| ((a, b), s)).collect());

/// Resolves compatibility for two optional MBTI codes. Always in `[0, 1]`.
///
/// 1. Either code absent or malformed → `NEUTRAL_COMPATIBILITY`.
/// 2. Table hit for (a, b) or (b, a) → table value.
/// 3. Otherwise the trait-letter heuristic.
pub fn compatibility(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a.and_then(Mbti::parse), b.and_then(Mbti::parse)) {
        (Some(a), Some(b)) => compatibility_of(a, b),
        _ => NEUTRAL_COMPATIBILITY,
    }
}

/// Compatibility between two already-validated codes.
pub fn compatibility_of(a: Mbti, b: Mbti) -> f64 {
    table_lookup(a, b).unwrap_or_else(|| heuristic(a, b))
}

fn table_lookup(a: Mbti, b: Mbti) -> Option<f64> {
    COMPATIBILITY_TABLE
        .get(&(a.as_str(), b.as_str()))
        .or_else(|| COMPATIBILITY_TABLE.get(&(b.as_str(), a.as_str())))
        .copied()
}

fn heuristic(a: Mbti, b: Mbti) -> f64 {
    let mut score = HEURISTIC_BASE;
    if a.decision() == b.decision() {
        score += SAME_THINKING_FEELING_BONUS;
    }
    if a.lifestyle() == b.lifestyle() {
        score += SAME_JUDGING_PERCEIVING_BONUS;
    }
    if a.energy() != b.energy() {
        score += COMPLEMENTARY_ENERGY_BONUS;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_types() -> Vec<String> {
        let mut out = Vec::with_capacity(16);
        for e in ["E", "I"] {
            for s in ["S", "N"] {
                for t in ["T", "F"] {
                    for j in ["J", "P"] {
                        out.push(format!("{e}{s}{t}{j}"));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_parse_accepts_all_sixteen_types() {
        let types = all_types();
        assert_eq!(types.len(), 16);
        for t in &types {
            assert!(Mbti::parse(t).is_some(), "{t} should parse");
        }
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let parsed = Mbti::parse("  enfp ").unwrap();
        assert_eq!(parsed.as_str(), "ENFP");
        assert_eq!(parsed.to_string(), "ENFP");
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        for bad in ["", "ENF", "ENFPX", "XNFP", "EXFP", "ENXP", "ENFX", "1234", "ＥＮＦＰ"] {
            assert!(Mbti::parse(bad).is_none(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_missing_or_malformed_is_neutral() {
        assert_eq!(compatibility(None, Some("INTJ")), NEUTRAL_COMPATIBILITY);
        assert_eq!(compatibility(Some("ENFP"), None), NEUTRAL_COMPATIBILITY);
        assert_eq!(compatibility(Some(""), Some("INTJ")), NEUTRAL_COMPATIBILITY);
        assert_eq!(compatibility(Some("ABCD"), Some("INTJ")), NEUTRAL_COMPATIBILITY);
    }

    #[test]
    fn test_table_lookup_both_orders() {
        assert_eq!(compatibility(Some("ENFP"), Some("INTJ")), 0.9);
        assert_eq!(compatibility(Some("INTJ"), Some("ENFP")), 0.9);
        assert_eq!(compatibility(Some("estj"), Some("istp")), 0.8);
    }

    #[test]
    fn test_heuristic_for_unlisted_pair() {
        // ESTJ / ISTJ: same T, same J, different E/I → 0.5 + 0.2 + 0.15 + 0.1
        assert!((compatibility(Some("ESTJ"), Some("ISTJ")) - 0.95).abs() < 1e-9);
        // ESTJ / ESFP: nothing shared, same energy → base only
        assert!((compatibility(Some("ESTJ"), Some("ESFP")) - 0.5).abs() < 1e-9);
        // INFP / INFP: same F, same P, same energy
        assert!((compatibility(Some("INFP"), Some("INFP")) - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_and_bounded_for_every_pair() {
        let types = all_types();
        for a in &types {
            for b in &types {
                let ab = compatibility(Some(a), Some(b));
                let ba = compatibility(Some(b), Some(a));
                assert_eq!(ab, ba, "{a}/{b} not symmetric");
                assert!((0.0..=1.0).contains(&ab), "{a}/{b} out of range: {ab}");
            }
        }
    }

    #[test]
    fn test_table_has_no_conflicting_duplicates() {
        for (i, &(a, b, _)) in PAIR_TABLE.iter().enumerate() {
            for &(c, d, _) in &PAIR_TABLE[i + 1..] {
                assert!(
                    !((a == c && b == d) || (a == d && b == c)),
                    "pair {a}/{b} listed twice"
                );
            }
            assert!(Mbti::parse(a).is_some() && Mbti::parse(b).is_some());
        }
    }

    #[test]
    fn test_serde_roundtrip_rejects_invalid() {
        let ok: Mbti = serde_json::from_str(r#""intp""#).unwrap();
        assert_eq!(ok.as_str(), "INTP");
        assert!(serde_json::from_str::<Mbti>(r#""XXXX""#).is_err());
    }
}
