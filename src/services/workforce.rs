use crate::{
    common::SharedClock,
    errors::ServiceError,
    events::{Event, EventSender},
    filter::ListFilter,
    models::{AttendanceMark, AttendanceStatus, Worker},
    store::EntityStore,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Attendance counts for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub date: Option<NaiveDate>,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub excused: usize,
    /// Workers on file without a mark for the day.
    pub unmarked: usize,
}

/// Headcount by employment status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkforceSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

/// Service for workers and their daily attendance marks
pub struct WorkforceService {
    workers: EntityStore<Worker>,
    marks: EntityStore<AttendanceMark>,
    event_sender: EventSender,
    clock: SharedClock,
}

impl WorkforceService {
    pub fn new(event_sender: EventSender, clock: SharedClock) -> Self {
        Self {
            workers: EntityStore::new(),
            marks: EntityStore::new(),
            event_sender,
            clock,
        }
    }

    #[instrument(skip(self, worker), fields(name = %worker.name))]
    pub fn hire(&mut self, worker: Worker) -> Result<Worker, ServiceError> {
        let id = self.workers.create(worker)?;
        let created = self.workers.require(&id)?.clone();

        self.event_sender.send_or_log(Event::WorkerHired {
            worker_id: id.clone(),
            name: created.name.clone(),
        });
        info!(worker_id = %id, shift = %created.shift, "worker registered");
        Ok(created)
    }

    #[instrument(skip(self, worker))]
    pub fn update_worker(&mut self, id: &str, worker: Worker) -> Result<Worker, ServiceError> {
        self.workers.update(id, worker)?;
        let updated = self.workers.require(id)?.clone();

        self.event_sender.send_or_log(Event::RecordUpdated {
            kind: "Worker".into(),
            id: id.to_string(),
        });
        info!(worker_id = %id, status = %updated.status, "worker updated");
        Ok(updated)
    }

    /// Removes a worker. Their attendance history stays on file.
    #[instrument(skip(self))]
    pub fn remove_worker(&mut self, id: &str) -> Result<Worker, ServiceError> {
        let removed = self.workers.delete(id)?;
        self.event_sender.send_or_log(Event::RecordDeleted {
            kind: "Worker".into(),
            id: id.to_string(),
        });
        info!(worker_id = %id, "worker removed");
        Ok(removed)
    }

    pub fn worker(&self, id: &str) -> Option<&Worker> {
        self.workers.get(id)
    }

    pub fn workers(&self) -> Vec<&Worker> {
        self.workers.list()
    }

    /// Name/national id/position search narrowed by exact status.
    pub fn search_workers(&self, filter: &ListFilter) -> Vec<&Worker> {
        filter.apply(self.workers.iter())
    }

    pub fn workforce_summary(&self) -> WorkforceSummary {
        let total = self.workers.len();
        let active = self.workers.iter().filter(|w| w.is_active()).count();
        WorkforceSummary {
            total,
            active,
            inactive: total - active,
        }
    }

    /// Records `status` for a worker on `date`.
    ///
    /// At most one mark exists per worker and day: a second call replaces the
    /// status and entry time of the existing mark and keeps its id. The entry
    /// time is the clock's current hours and minutes.
    #[instrument(skip(self))]
    pub fn mark_attendance(
        &mut self,
        worker_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceMark, ServiceError> {
        self.workers.require(worker_id)?;
        let entry_time = self.clock.time_of_day();

        let mark = match self.marks.find(|mark| mark.is_for(worker_id, date)).cloned() {
            Some(mut existing) => {
                let id = existing.id.clone();
                existing.status = status;
                existing.entry_time = entry_time;
                self.marks.update(&id, existing)?;
                debug!(mark_id = %id, "attendance mark replaced");
                self.marks.require(&id)?.clone()
            }
            None => {
                let id = self.marks.create(AttendanceMark {
                    id: String::new(),
                    worker_id: worker_id.to_string(),
                    date,
                    entry_time,
                    exit_time: None,
                    status,
                    notes: None,
                })?;
                self.marks.require(&id)?.clone()
            }
        };

        self.event_sender.send_or_log(Event::AttendanceMarked {
            worker_id: worker_id.to_string(),
            date,
            status,
        });
        info!(worker_id, %date, %status, "attendance marked");
        Ok(mark)
    }

    /// Stores a complete mark as-is, e.g. from sample data. The worker must
    /// exist and have no mark for that day yet.
    pub fn import_mark(&mut self, mark: AttendanceMark) -> Result<AttendanceMark, ServiceError> {
        self.workers.require(&mark.worker_id)?;
        if self
            .marks
            .find(|existing| existing.is_for(&mark.worker_id, mark.date))
            .is_some()
        {
            return Err(ServiceError::duplicate_id(
                "AttendanceMark",
                &format!("{}@{}", mark.worker_id, mark.date),
            ));
        }
        let id = self.marks.create(mark)?;
        Ok(self.marks.require(&id)?.clone())
    }

    pub fn attendance_for(&self, worker_id: &str, date: NaiveDate) -> Option<&AttendanceMark> {
        self.marks.find(|mark| mark.is_for(worker_id, date))
    }

    pub fn marks_for_date(&self, date: NaiveDate) -> Vec<&AttendanceMark> {
        self.marks.iter().filter(|mark| mark.date == date).collect()
    }

    pub fn marks(&self) -> Vec<&AttendanceMark> {
        self.marks.list()
    }

    pub fn daily_summary(&self, date: NaiveDate) -> AttendanceSummary {
        let mut summary = AttendanceSummary {
            date: Some(date),
            ..AttendanceSummary::default()
        };
        for mark in self.marks_for_date(date) {
            match mark.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Excused => summary.excused += 1,
            }
        }
        summary.unmarked = self
            .workers
            .iter()
            .filter(|worker| self.attendance_for(&worker.id, date).is_none())
            .count();
        summary
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
