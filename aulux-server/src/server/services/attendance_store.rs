use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use itertools::Itertools;

use crate::server::models::{AttendanceFilter, AttendanceRecord, AttendanceStatus};

/// Whether an upsert created a new record or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

pub trait AttendanceRepository: Send + Sync {
    /// Insert or overwrite the record for its `(event_id, student_id)` pair.
    fn upsert(&self, record: AttendanceRecord) -> (AttendanceRecord, Upsert);

    fn list(&self, filter: &AttendanceFilter) -> Vec<AttendanceRecord>;

    fn get(&self, record_id: &str) -> Option<AttendanceRecord>;

    /// Change status and/or notes. `None` leaves a field untouched.
    fn update(
        &self,
        record_id: &str,
        status: Option<AttendanceStatus>,
        notes: Option<String>,
        updated_by: &str,
    ) -> Option<AttendanceRecord>;

    fn delete(&self, record_id: &str) -> Option<AttendanceRecord>;
}

type RecordKey = (String, String);

/// Process-local attendance records; lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    records: DashMap<RecordKey, AttendanceRecord>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_of(&self, record_id: &str) -> Option<RecordKey> {
        self.records
            .iter()
            .find(|entry| entry.id == record_id)
            .map(|entry| entry.key().clone())
    }
}

impl AttendanceRepository for InMemoryAttendanceStore {
    fn upsert(&self, mut record: AttendanceRecord) -> (AttendanceRecord, Upsert) {
        let key = (record.event_id.clone(), record.student_id.clone());
        match self.records.entry(key) {
            Entry::Occupied(mut existing) => {
                record.id = existing.get().id.clone();
                record.updated_at = Some(Utc::now());
                existing.insert(record.clone());
                (record, Upsert::Updated)
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                (record, Upsert::Created)
            }
        }
    }

    fn list(&self, filter: &AttendanceFilter) -> Vec<AttendanceRecord> {
        self.records
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .sorted_by(|a, b| a.timestamp.cmp(&b.timestamp))
            .collect()
    }

    fn get(&self, record_id: &str) -> Option<AttendanceRecord> {
        self.records
            .iter()
            .find(|entry| entry.id == record_id)
            .map(|entry| entry.value().clone())
    }

    fn update(
        &self,
        record_id: &str,
        status: Option<AttendanceStatus>,
        notes: Option<String>,
        updated_by: &str,
    ) -> Option<AttendanceRecord> {
        let key = self.key_of(record_id)?;
        let mut record = self.records.get_mut(&key)?;
        if let Some(status) = status {
            record.status = status;
        }
        if let Some(notes) = notes {
            record.notes = notes;
        }
        record.updated_at = Some(Utc::now());
        record.updated_by = Some(updated_by.to_string());
        Some(record.clone())
    }

    fn delete(&self, record_id: &str) -> Option<AttendanceRecord> {
        let key = self.key_of(record_id)?;
        self.records.remove(&key).map(|(_, record)| record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(event: &str, student: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            event_id: event.to_string(),
            course_id: "course-1".to_string(),
            course_name: "Curso".to_string(),
            student_id: student.to_string(),
            student_name: "Estudiante".to_string(),
            student_email: String::new(),
            status,
            date: "2025-03-10".parse().unwrap(),
            time: "10:00:00".to_string(),
            location: "Virtual".to_string(),
            notes: String::new(),
            timestamp: Utc::now(),
            recorded_by: "prof@aulux.org".to_string(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn duplicate_event_and_student_overwrites() {
        let store = InMemoryAttendanceStore::new();
        let (first, outcome) = store.upsert(record("e1", "s1", AttendanceStatus::Present));
        assert_eq!(outcome, Upsert::Created);

        let (second, outcome) = store.upsert(record("e1", "s1", AttendanceStatus::Late));
        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(second.id, first.id);
        assert!(second.updated_at.is_some());

        let all = store.list(&AttendanceFilter::default());
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, AttendanceStatus::Late);
    }

    #[test]
    fn different_students_are_separate_records() {
        let store = InMemoryAttendanceStore::new();
        store.upsert(record("e1", "s1", AttendanceStatus::Present));
        store.upsert(record("e1", "s2", AttendanceStatus::Absent));

        let filter = AttendanceFilter {
            student_id: Some("s2".to_string()),
            ..Default::default()
        };
        let found = store.list(&filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, AttendanceStatus::Absent);
        assert_eq!(store.list(&AttendanceFilter::default()).len(), 2);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let store = InMemoryAttendanceStore::new();
        let (created, _) = store.upsert(record("e1", "s1", AttendanceStatus::Present));

        let updated = store
            .update(&created.id, None, Some("llegó tarde".to_string()), "coord@aulux.org")
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Present);
        assert_eq!(updated.notes, "llegó tarde");
        assert_eq!(updated.updated_by.as_deref(), Some("coord@aulux.org"));

        assert!(store.update("missing", None, None, "x").is_none());
    }

    #[test]
    fn delete_returns_removed_record() {
        let store = InMemoryAttendanceStore::new();
        let (created, _) = store.upsert(record("e1", "s1", AttendanceStatus::Absent));

        assert_eq!(store.delete(&created.id).map(|r| r.id), Some(created.id.clone()));
        assert!(store.get(&created.id).is_none());
        assert!(store.delete(&created.id).is_none());
    }
}
