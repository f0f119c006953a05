//! Per-category condition sets attached to generated attestations.

use serde::{Deserialize, Serialize};
use verity_types::DataType;

/// Comparison operator applied to an attested field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOp {
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

/// A single condition the attestor checks before signing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub op: ConditionOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Condition {
    fn new(field: &str, op: ConditionOp, value: Option<&str>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.map(str::to_string),
        }
    }
}

/// The condition set an attestor is asked to enforce for a data category.
pub fn conditions_for(data_type: DataType) -> Vec<Condition> {
    use ConditionOp::*;
    match data_type {
        DataType::Identity => vec![
            Condition::new("name", Sha256, None),
            Condition::new("verified", Eq, Some("true")),
        ],
        DataType::Income => vec![
            Condition::new("amount", Gt, Some("0")),
            Condition::new("verified", Eq, Some("true")),
        ],
        DataType::CreditScore => vec![
            Condition::new("score", Ge, Some("300")),
            Condition::new("score", Le, Some("850")),
        ],
        DataType::SocialMedia => vec![
            Condition::new("platform", Sha256, None),
            Condition::new("verified", Eq, Some("true")),
        ],
        DataType::Education => vec![
            Condition::new("institution", Sha256, None),
            Condition::new("verified", Eq, Some("true")),
        ],
    }
}
