//! Scheme names accepted by the binner.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ClassifyError;

/// A classification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    EqualInterval,
    Quantiles,
    FisherJenks,
    /// Bin edges come verbatim from the caller.
    UserDefined,
}

impl Scheme {
    /// All valid scheme names, as accepted by [`Scheme::from_str`].
    pub const NAMES: [&'static str; 4] = [
        "equal_interval",
        "quantiles",
        "fisher_jenks",
        "user_defined",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::EqualInterval => "equal_interval",
            Scheme::Quantiles => "quantiles",
            Scheme::FisherJenks => "fisher_jenks",
            Scheme::UserDefined => "user_defined",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ClassifyError;

    /// Case-insensitive parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equal_interval" => Ok(Scheme::EqualInterval),
            "quantiles" => Ok(Scheme::Quantiles),
            "fisher_jenks" => Ok(Scheme::FisherJenks),
            "user_defined" => Ok(Scheme::UserDefined),
            _ => Err(ClassifyError::UnsupportedScheme(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Fisher_Jenks".parse::<Scheme>().unwrap(), Scheme::FisherJenks);
        assert_eq!("QUANTILES".parse::<Scheme>().unwrap(), Scheme::Quantiles);
    }

    #[test]
    fn test_unsupported_scheme_lists_valid_names() {
        let err = "bogus".parse::<Scheme>().unwrap_err();
        let message = err.to_string();
        for name in Scheme::NAMES {
            assert!(message.contains(name), "missing {name} in: {message}");
        }
    }

    #[test]
    fn test_round_trip_names() {
        for name in Scheme::NAMES {
            assert_eq!(name.parse::<Scheme>().unwrap().as_str(), name);
        }
    }
}
