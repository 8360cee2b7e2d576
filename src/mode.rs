//! Emphasis strategy selection.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Which leading portion of a word gets emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// Emphasize the first phonetic syllable.
    #[default]
    Syllable,
    /// Emphasize a prefix whose length depends on the word length.
    Bionic,
}

impl Mode {
    /// Both modes, in a stable order.
    pub const ALL: [Mode; 2] = [Mode::Syllable, Mode::Bionic];

    /// The selector string accepted by [`Mode::from_str`].
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Syllable => "syllable",
            Mode::Bionic => "bionic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    /// Only the exact selectors `"syllable"` and `"bionic"` are recognized;
    /// anything else is rejected rather than silently defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "syllable" => Ok(Mode::Syllable),
            "bionic" => Ok(Mode::Bionic),
            other => Err(Error::UnsupportedMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_modes() {
        assert_eq!("syllable".parse::<Mode>().unwrap(), Mode::Syllable);
        assert_eq!("bionic".parse::<Mode>().unwrap(), Mode::Bionic);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        for bad in ["", "Bionic", "SYLLABLE", "fast", " bionic"] {
            match bad.parse::<Mode>() {
                Err(Error::UnsupportedMode(s)) => assert_eq!(s, bad),
                other => panic!("expected UnsupportedMode for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_default_is_syllable() {
        assert_eq!(Mode::default(), Mode::Syllable);
    }
}
