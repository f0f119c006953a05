//! Verification data categories.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of off-chain data a verification attests to.
///
/// The string forms are part of the ledger interface: the contract stores the
/// category as an opaque string, so the exact spelling matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Identity,
    Income,
    CreditScore,
    SocialMedia,
    Education,
}

impl DataType {
    /// All supported categories, in display order.
    pub const ALL: [DataType; 5] = [
        DataType::Identity,
        DataType::Income,
        DataType::CreditScore,
        DataType::SocialMedia,
        DataType::Education,
    ];

    /// The wire form stored by the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Income => "income",
            Self::CreditScore => "credit_score",
            Self::SocialMedia => "social_media",
            Self::Education => "education",
        }
    }
}

impl FromStr for DataType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(Self::Identity),
            "income" => Ok(Self::Income),
            "credit_score" => Ok(Self::CreditScore),
            "social_media" => Ok(Self::SocialMedia),
            "education" => Ok(Self::Education),
            other => Err(TypeError::InvalidDataType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
