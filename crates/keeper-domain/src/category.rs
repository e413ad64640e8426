use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trading-venue class of a pair. Determines which calendar rule applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crypto,
    FxOrCommodity,
    Equity,
    Index,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Crypto => "crypto",
            Category::FxOrCommodity => "fx_or_commodity",
            Category::Equity => "equity",
            Category::Index => "index",
            Category::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crypto" => Ok(Category::Crypto),
            "fx_or_commodity" => Ok(Category::FxOrCommodity),
            "equity" => Ok(Category::Equity),
            "index" => Ok(Category::Index),
            "unknown" => Ok(Category::Unknown),
            _ => Err(format!("'{}' is not a valid category", s)),
        }
    }
}
