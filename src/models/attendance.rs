use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::Validate;

use crate::filter::Searchable;
use crate::store::Record;

/// Manually chosen daily attendance classification.
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
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

/// One daily attendance record for one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AttendanceMark {
    #[serde(default)]
    pub id: String,

    #[validate(length(min = 1, message = "worker reference is required"))]
    pub worker_id: String,

    pub date: NaiveDate,

    pub entry_time: NaiveTime,

    #[serde(default)]
    pub exit_time: Option<NaiveTime>,

    pub status: AttendanceStatus,

    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceMark {
    pub fn is_for(&self, worker_id: &str, date: NaiveDate) -> bool {
        self.worker_id == worker_id && self.date == date
    }
}

impl Record for AttendanceMark {
    const KIND: &'static str = "AttendanceMark";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Searchable for AttendanceMark {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.worker_id.as_str()];
        if let Some(notes) = &self.notes {
            fields.push(notes.as_str());
        }
        fields
    }

    fn category(&self) -> &str {
        self.status.as_ref()
    }
}
