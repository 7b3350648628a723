use crate::errors::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of builder produced the results being queried.
///
/// The text form doubles as the results-table infix
/// (`..._ci_test_results`) and the LUCI realm suffix (`chromium:ci`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderType {
    Ci,
    Try,
}

impl BuilderType {
    pub const ALL: [BuilderType; 2] = [BuilderType::Ci, BuilderType::Try];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuilderType::Ci => "ci",
            BuilderType::Try => "try",
        }
    }
}

impl fmt::Display for BuilderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuilderType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ci" => Ok(BuilderType::Ci),
            "try" => Ok(BuilderType::Try),
            other => Err(QueryError::UnknownBuilderType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!("ci".parse::<BuilderType>().unwrap(), BuilderType::Ci);
        assert_eq!("try".parse::<BuilderType>().unwrap(), BuilderType::Try);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        for bad in ["", "CI", "release", "tryjob"] {
            let err = bad.parse::<BuilderType>().unwrap_err();
            assert!(matches!(err, QueryError::UnknownBuilderType(ref s) if s == bad));
        }
    }

    #[test]
    fn test_display_matches_parse() {
        for bt in BuilderType::ALL {
            assert_eq!(bt.to_string().parse::<BuilderType>().unwrap(), bt);
        }
    }
}
