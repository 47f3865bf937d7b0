pub mod calendar;
pub mod course_work;
pub mod courses;
pub mod students;
pub mod submissions;
pub mod userinfo;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Google's calendar date message. Any component may be zero when unset.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub day: u32,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month(), date.day())
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Google's time-of-day message. Omitted fields mean zero.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
    #[serde(default)]
    pub nanos: u32,
}

impl TimeOfDay {
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_nano_opt(self.hours, self.minutes, self.seconds, self.nanos)
    }
}

/// Combine a due date with an optional due time.
///
/// Without a time the deadline is the last second of the day.
pub fn deadline(date: &Date, time: Option<&TimeOfDay>) -> Option<NaiveDateTime> {
    let day = date.to_naive_date()?;
    let time = match time {
        Some(t) => t.to_naive_time()?,
        None => NaiveTime::from_hms_opt(23, 59, 59)?,
    };
    Some(day.and_time(time))
}

/// Query parameters shared by every Classroom list call.
#[derive(Default, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}
