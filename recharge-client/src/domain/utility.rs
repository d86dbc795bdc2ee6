use std::{fmt, str::FromStr};

use crate::error::DomainError;

/// Utility carried by a meter.
///
/// Variants are declared in code order (`E` < `G` < `W`) so that grouped
/// output sorts the same way the single-letter codes do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UtilityType {
    Electric,
    Gas,
    Water,
}

impl UtilityType {
    /// Single-letter code used in readings files and configuration.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Electric => "E",
            Self::Gas => "G",
            Self::Water => "W",
        }
    }
}

impl fmt::Display for UtilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UtilityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "E" | "Electric" => Ok(Self::Electric),
            "G" | "Gas" => Ok(Self::Gas),
            "W" | "Water" => Ok(Self::Water),
            other => Err(DomainError::UtilityCode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_names() {
        assert_eq!("G".parse::<UtilityType>(), Ok(UtilityType::Gas));
        assert_eq!(" E ".parse::<UtilityType>(), Ok(UtilityType::Electric));
        assert_eq!("Water".parse::<UtilityType>(), Ok(UtilityType::Water));
        assert!(matches!("X".parse::<UtilityType>(), Err(DomainError::UtilityCode(_))));
    }

    #[test]
    fn orders_by_code() {
        let mut all = vec![UtilityType::Water, UtilityType::Gas, UtilityType::Electric];
        all.sort();
        assert_eq!(all.iter().map(|u| u.code()).collect::<Vec<_>>(), vec!["E", "G", "W"]);
    }
}
