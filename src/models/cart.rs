use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::Validate;

use super::validate_positive;
use crate::filter::Searchable;
use crate::store::Record;

/// Operating state of a haul cart.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum CartStatus {
    #[default]
    Active,
    Maintenance,
    OutOfService,
}

/// A mine-haul transport unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Cart {
    /// Store-assigned identifier; empty until created.
    #[serde(default)]
    pub id: String,

    /// Fleet code, e.g. `CC-001`.
    #[validate(length(min = 1, message = "cart code is required"))]
    pub code: String,

    /// Load capacity; must be positive.
    #[validate(custom = "validate_positive")]
    pub capacity: Decimal,

    #[serde(default)]
    pub status: CartStatus,

    pub location: String,

    /// Set on creation when not supplied.
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,

    #[serde(default)]
    pub last_maintenance: Option<NaiveDate>,
}

impl Cart {
    pub fn new(code: impl Into<String>, capacity: Decimal, location: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            code: code.into(),
            capacity,
            status: CartStatus::Active,
            location: location.into(),
            registration_date: None,
            last_maintenance: None,
        }
    }

    pub fn with_status(mut self, status: CartStatus) -> Self {
        self.status = status;
        self
    }
}

impl Record for Cart {
    const KIND: &'static str = "Cart";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Searchable for Cart {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.code.as_str(), self.location.as_str()]
    }

    fn category(&self) -> &str {
        self.status.as_ref()
    }
}
