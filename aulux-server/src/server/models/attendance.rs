use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn counts_as_attended(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            other => Err(format!(
                "Invalid status '{}': must be present, absent or late",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub event_id: String,
    pub course_id: String,
    pub course_name: String,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
    /// Wall-clock time of the class, `HH:MM:SS`.
    pub time: String,
    pub location: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
    pub recorded_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Filters for `GET /api/attendance`; every field is optional and an empty
/// value means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub event_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_to: Option<NaiveDate>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        fn eq(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().is_none_or(|f| f == value)
        }

        eq(&self.course_id, &record.course_id)
            && eq(&self.event_id, &record.event_id)
            && eq(&self.student_id, &record.student_id)
            && self.date_from.is_none_or(|from| record.date >= from)
            && self.date_to.is_none_or(|to| record.date <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_records: usize,
    pub present_count: usize,
    pub late_count: usize,
    pub absent_count: usize,
    pub attendance_rate: u32,
}

impl AttendanceStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total_records += 1;
            match record.status {
                AttendanceStatus::Present => stats.present_count += 1,
                AttendanceStatus::Late => stats.late_count += 1,
                AttendanceStatus::Absent => stats.absent_count += 1,
            }
        }
        stats.attendance_rate = percentage(
            stats.present_count + stats.late_count,
            stats.total_records,
        );
        stats
    }
}

/// Rounded percentage, 0 when the total is 0.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (part as f64 / total as f64 * 100.0).round() as u32
    }
}

// POST /api/attendance
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceRequest {
    pub event_id: Option<String>,
    pub course_id: Option<String>,
    pub course_name: Option<String>,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

// PUT /api/attendance
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceRequest {
    pub record_id: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

// DELETE /api/attendance
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAttendanceParams {
    pub record_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceListResponse {
    pub records: Vec<AttendanceRecord>,
    pub stats: AttendanceStats,
    pub filters: AttendanceFilter,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub success: bool,
    pub record: AttendanceRecord,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDeletedResponse {
    pub success: bool,
    pub deleted_record: AttendanceRecord,
    pub message: String,
}
