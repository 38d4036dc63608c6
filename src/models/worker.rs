use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::Validate;

use crate::filter::Searchable;
use crate::store::Record;

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
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

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
pub enum WorkerStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Worker {
    #[serde(default)]
    pub id: String,

    #[validate(length(min = 1, message = "worker name is required"))]
    pub name: String,

    /// National identity document number.
    #[validate(length(min = 1, message = "national id is required"))]
    pub national_id: String,

    pub position: String,

    pub shift: Shift,

    pub phone: String,

    pub email: String,

    pub hire_date: NaiveDate,

    #[serde(default)]
    pub status: WorkerStatus,
}

impl Worker {
    pub fn is_active(&self) -> bool {
        self.status == WorkerStatus::Active
    }
}

impl Record for Worker {
    const KIND: &'static str = "Worker";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Searchable for Worker {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.national_id.as_str(),
            self.position.as_str(),
        ]
    }

    fn category(&self) -> &str {
        self.status.as_ref()
    }
}
