use bigdecimal::BigDecimal;
use serde::Deserialize;

use crate::helpers::{deserialize_optional_decimal, deserialize_timestamp};

/// One raw record of the private ledger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerEntry {
    #[serde(default)]
    pub refid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub time: f64,
    #[serde(rename = "type", default)]
    pub r#type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub asset: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub amount: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub fee: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub balance: Option<BigDecimal>,
}
