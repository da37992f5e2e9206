//! County name normalization shared by every source.
//!
//! The three inputs spell county names differently ("OBRIEN", "O'Brien",
//! "Story County", "POTTAWATTAMIE"). Every name passes through the same
//! [`NameNormalizer`] before it is used as a join key, and the residual
//! exceptions are resolved by an explicit value-keyed override table.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// Normalized county name used as the join key between sources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CountyKey(String);

impl CountyKey {
    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CountyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static COUNTY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+county$").expect("static regex"));

/// Case-fold and title-case a raw county name.
///
/// Words start after whitespace or a hyphen. A letter following a
/// single-letter apostrophe prefix ("O'", "D'") also starts a word, so
/// "O'BRIEN" and "o'brien" both become "O'Brien".
pub fn canonical_case(raw: &str) -> String {
    let unified = raw.trim()
        .replace(['\u{2018}', '\u{2019}', '`'], "'")
        .replace(['\u{2013}', '\u{2014}'], "-");
    let collapsed = WHITESPACE.replace_all(&unified, " ");
    let stripped = COUNTY_SUFFIX.replace(&collapsed, "");
    let lower = stripped.to_lowercase();

    let mut out = String::with_capacity(lower.len());
    let mut word_len = 0usize;
    let mut after_prefix = false;
    for ch in lower.chars() {
        let starts_word = word_len == 0 || after_prefix;
        after_prefix = false;
        match ch {
            ' ' | '-' => {
                out.push(ch);
                word_len = 0;
            }
            '\'' => {
                out.push(ch);
                after_prefix = word_len == 1;
                word_len += 1;
            }
            _ => {
                if starts_word { out.extend(ch.to_uppercase()) } else { out.push(ch) }
                word_len += 1;
            }
        }
    }
    out
}

/// Normalizes raw county names into [`CountyKey`]s.
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    overrides: BTreeMap<String, String>,
}

impl NameNormalizer {
    /// Build a normalizer. Override keys and values are themselves
    /// canonicalized, so `{"OBRIEN": "O'Brien"}` and `{"Obrien": "O'Brien"}`
    /// are equivalent.
    pub fn new<K: AsRef<str>, V: AsRef<str>>(overrides: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            overrides: overrides.into_iter()
                .map(|(from, to)| (canonical_case(from.as_ref()), canonical_case(to.as_ref())))
                .collect(),
        }
    }

    /// Normalize a raw name; blank names yield `None`.
    pub fn key(&self, raw: &str) -> Option<CountyKey> {
        let name = canonical_case(raw);
        if name.is_empty() { return None }
        Some(CountyKey(self.overrides.get(&name).cloned().unwrap_or(name)))
    }

    /// Number of override entries.
    #[inline] pub fn len(&self) -> usize { self.overrides.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.overrides.is_empty() }
}
