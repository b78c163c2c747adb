//! # Locales
//!
//! The languages Kalcufy is published in. English is the fallback for every
//! translation lookup and the only bundle a calculator is required to carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// A supported UI language.
///
/// Serializes as its lowercase code (`"en"`, `"es"`, ...), which is also the
/// key used in catalog TOML files and generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Es,
    Pt,
    Fr,
    De,
}

impl Locale {
    /// Every supported locale, in publication order.
    pub const ALL: [Locale; 5] = [Locale::En, Locale::Es, Locale::Pt, Locale::Fr, Locale::De];

    /// Locale used when a translation is missing.
    pub const FALLBACK: Locale = Locale::En;

    /// Two-letter code
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Pt => "pt",
            Locale::Fr => "fr",
            Locale::De => "de",
        }
    }

    /// Name of the language in that language
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Español",
            Locale::Pt => "Português",
            Locale::Fr => "Français",
            Locale::De => "Deutsch",
        }
    }

    /// Digit group separator
    pub fn thousands_separator(&self) -> char {
        match self {
            Locale::En => ',',
            Locale::Es | Locale::Pt | Locale::De => '.',
            Locale::Fr => ' ',
        }
    }

    /// Decimal separator
    pub fn decimal_separator(&self) -> char {
        match self {
            Locale::En => '.',
            Locale::Es | Locale::Pt | Locale::Fr | Locale::De => ',',
        }
    }

    /// Whether a space goes between a number and its `%` sign
    pub fn spaced_percent(&self) -> bool {
        matches!(self, Locale::Fr | Locale::De)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::FALLBACK
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            "pt" => Ok(Locale::Pt),
            "fr" => Ok(Locale::Fr),
            "de" => Ok(Locale::De),
            other => Err(CalcError::UnknownLocale {
                code: other.to_string(),
            }),
        }
    }
}

/// Serde adapter for maps keyed by [`Locale`].
///
/// Keys travel as plain strings so the same map round-trips through both
/// TOML tables and JSON objects; unknown codes are rejected on load.
pub mod locale_map {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Locale;

    pub fn serialize<S, V>(map: &BTreeMap<Locale, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let keyed: BTreeMap<&'static str, &V> = map.iter().map(|(k, v)| (k.code(), v)).collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<Locale, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(code, v)| code.parse::<Locale>().map(|l| (l, v)).map_err(D::Error::custom))
            .collect()
    }
}
