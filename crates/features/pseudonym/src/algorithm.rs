//! The algorithm table.
//!
//! Each [`Algorithm`] variant is one generation strategy; [`AlgorithmRegistry::select`] maps a
//! configured name onto it. Lookups are case-insensitive and never fail: an unknown name
//! yields [`Selection::Substituted`] with the letters strategy, and the caller decides what to
//! do with that information. The domain configuration is never rewritten.

use psn_domain::constants::{DECIMAL_ALPHABET, HEX_ALPHABET, LETTERS_ALPHABET};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Strategy substituted for unknown algorithm names.
pub const FALLBACK_ALGORITHM: Algorithm = Algorithm::RandomLetters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Sha3_256,
    /// 64-bit xxHash seeded from the domain salt.
    XxHash64,
    /// Uniform draw from the configured alphabet.
    Random,
    RandomHex,
    RandomNumeric,
    RandomLetters,
    /// The domain counter rendered in decimal.
    Consecutive,
}

/// How a strategy produces its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Digest,
    KeyedHash,
    Random,
    Counter,
}

// Canonical name first, aliases after.
const TABLE: &[(&str, Algorithm)] = &[
    ("MD5", Algorithm::Md5),
    ("SHA1", Algorithm::Sha1),
    ("SHA-1", Algorithm::Sha1),
    ("SHA2", Algorithm::Sha256),
    ("SHA256", Algorithm::Sha256),
    ("SHA-256", Algorithm::Sha256),
    ("SHA512", Algorithm::Sha512),
    ("SHA-512", Algorithm::Sha512),
    ("SHA3", Algorithm::Sha3_256),
    ("SHA3-256", Algorithm::Sha3_256),
    ("XXHASH", Algorithm::XxHash64),
    ("XXH64", Algorithm::XxHash64),
    ("RANDOM", Algorithm::Random),
    ("RANDOM_HEX", Algorithm::RandomHex),
    ("RANDOM_NUM", Algorithm::RandomNumeric),
    ("RANDOM_LET", Algorithm::RandomLetters),
    ("CONSECUTIVE", Algorithm::Consecutive),
];

impl Algorithm {
    pub const ALL: [Self; 11] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha512,
        Self::Sha3_256,
        Self::XxHash64,
        Self::Random,
        Self::RandomHex,
        Self::RandomNumeric,
        Self::RandomLetters,
        Self::Consecutive,
    ];

    /// Canonical configuration name.
    #[must_use]
    pub fn name(self) -> &'static str {
        TABLE.iter().find(|(_, a)| *a == self).map_or("RANDOM_LET", |(name, _)| name)
    }

    /// Case-insensitive lookup including aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        TABLE.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, a)| *a)
    }

    #[must_use]
    pub const fn kind(self) -> StrategyKind {
        match self {
            Self::Md5 | Self::Sha1 | Self::Sha256 | Self::Sha512 | Self::Sha3_256 => {
                StrategyKind::Digest
            },
            Self::XxHash64 => StrategyKind::KeyedHash,
            Self::Random | Self::RandomHex | Self::RandomNumeric | Self::RandomLetters => {
                StrategyKind::Random
            },
            Self::Consecutive => StrategyKind::Counter,
        }
    }

    /// Whether generation consumes a counter value. Hashes only do when several pseudonyms
    /// per identifier are allowed.
    #[must_use]
    pub const fn uses_counter(self, multiple_per_identifier: bool) -> bool {
        match self.kind() {
            StrategyKind::Counter => true,
            StrategyKind::Digest | StrategyKind::KeyedHash => multiple_per_identifier,
            StrategyKind::Random => false,
        }
    }

    /// Same input, same output.
    #[must_use]
    pub const fn is_deterministic(self) -> bool {
        matches!(self.kind(), StrategyKind::Digest | StrategyKind::KeyedHash)
    }

    /// Alphabet the raw output is drawn from; `configured` is the domain alphabet.
    #[must_use]
    pub fn output_alphabet(self, configured: &str) -> &str {
        match self {
            Self::Random => configured,
            Self::RandomNumeric | Self::Consecutive => DECIMAL_ALPHABET,
            Self::RandomLetters => LETTERS_ALPHABET,
            _ => HEX_ALPHABET,
        }
    }

    /// Alphabet of the check character for values of this strategy.
    #[must_use]
    pub fn check_digit_alphabet(self, configured: &str) -> &str {
        self.output_alphabet(configured)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of an algorithm lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "selection", rename_all = "snake_case")]
pub enum Selection {
    Exact { used: Algorithm },
    Substituted { requested: String, used: Algorithm },
}

impl Selection {
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Exact { used } | Self::Substituted { used, .. } => *used,
        }
    }

    #[must_use]
    pub const fn is_substituted(&self) -> bool {
        matches!(self, Self::Substituted { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlgorithmRegistry;

impl AlgorithmRegistry {
    /// Maps a configured name to a strategy, substituting [`FALLBACK_ALGORITHM`] with a
    /// warning for unknown names.
    #[must_use]
    pub fn select(name: &str) -> Selection {
        Algorithm::from_name(name).map_or_else(
            || {
                warn!(
                    requested = %name,
                    used = %FALLBACK_ALGORITHM,
                    "Unknown pseudonymization algorithm, substituting fallback"
                );
                Selection::Substituted { requested: name.to_owned(), used: FALLBACK_ALGORITHM }
            },
            |used| Selection::Exact { used },
        )
    }

    /// Canonical names of every strategy.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Algorithm::ALL.into_iter().map(Algorithm::name)
    }
}
