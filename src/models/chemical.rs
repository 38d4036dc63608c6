use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::Validate;

use super::validate_non_negative;
use crate::common::out_of_range;
use crate::errors::ServiceError;
use crate::filter::Searchable;
use crate::services::inventory::classify;
use crate::store::Record;

/// Stock tier of a chemical relative to its minimum stock.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    LowStock,
    MediumStock,
    NormalStock,
}

/// A tracked chemical inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Chemical {
    #[serde(default)]
    pub id: String,

    #[validate(length(min = 1, message = "chemical name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "chemical code is required"))]
    pub code: String,

    /// Free-text category, e.g. `Reactivos`.
    pub category: String,

    #[validate(custom = "validate_non_negative")]
    pub stock: Decimal,

    #[validate(custom = "validate_non_negative")]
    pub minimum_stock: Decimal,

    /// Unit the stock figures are expressed in (`kg`, `ton`, ...).
    pub unit: String,

    #[validate(custom = "validate_non_negative")]
    pub unit_price: Decimal,

    pub supplier: String,

    pub expiration_date: NaiveDate,

    pub storage_location: String,
}

impl Chemical {
    pub fn stock_status(&self) -> StockStatus {
        classify(self.stock, self.minimum_stock)
    }

    /// Stock valued at unit price.
    pub fn stock_value(&self) -> Result<Decimal, ServiceError> {
        self.stock
            .checked_mul(self.unit_price)
            .ok_or_else(|| out_of_range("stock"))
    }

    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.expiration_date < date
    }
}

impl Record for Chemical {
    const KIND: &'static str = "Chemical";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        self.stock_value()?;
        Ok(())
    }
}

impl Searchable for Chemical {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.code.as_str(),
            self.supplier.as_str(),
        ]
    }

    fn category(&self) -> &str {
        &self.category
    }
}
