use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AppointmentId {
    type Err = ParseDisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(AppointmentId)
            .map_err(|_| ParseDisplayError::Id(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDisplayError {
    #[error("'{0}' is not a valid appointment id")]
    Id(String),
    #[error("'{0}' does not match the D/M/Y HH:MM layout")]
    DateTime(String),
}

/// Appointment date and time as five bounded integers. No calendar check is
/// made, so 30/2 is a perfectly good day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAt {
    pub day: u8,
    pub month: u8,
    pub year: u16,
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for ScheduledAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} {:02}:{:02}",
            self.day, self.month, self.year, self.hour, self.minute
        )
    }
}

impl FromStr for ScheduledAt {
    type Err = ParseDisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDisplayError::DateTime(s.to_string());

        let (date, time) = s.trim().split_once(' ').ok_or_else(err)?;
        let mut date = date.split('/');
        let (hour, minute) = time.split_once(':').ok_or_else(err)?;

        let next = |part: Option<&str>| part.and_then(|p| p.parse::<u16>().ok()).ok_or_else(err);
        let day = next(date.next())?;
        let month = next(date.next())?;
        let year = next(date.next())?;
        let hour = next(Some(hour))?;
        let minute = next(Some(minute))?;
        if date.next().is_some() {
            return Err(err());
        }

        Ok(ScheduledAt {
            day: u8::try_from(day).map_err(|_| err())?,
            month: u8::try_from(month).map_err(|_| err())?,
            year,
            hour: u8::try_from(hour).map_err(|_| err())?,
            minute: u8::try_from(minute).map_err(|_| err())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientName {
    pub first_name: String,
    pub surnames: String,
}

impl PatientName {
    /// Splits a display name back into its parts: the first space-separated
    /// token is the first name, everything after it the surnames.
    pub fn from_display(display: &str) -> Self {
        let (first_name, surnames) = display.split_once(' ').unwrap_or((display, ""));
        Self {
            first_name: first_name.to_string(),
            surnames: surnames.to_string(),
        }
    }
}

impl fmt::Display for PatientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.surnames)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub scheduled_at: ScheduledAt,
    pub patient_name: PatientName,
    pub national_id: String,
    pub phone: String,
    pub birth_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
