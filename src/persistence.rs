use crate::{
    backend::CookieStore,
    cookie::{percent_decode, percent_encode, Cookie, CookieError},
    types::{Appointment, AppointmentId},
};
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{error, warn};

/// Browsers cap a single cookie at roughly this many bytes.
pub const COOKIE_SIZE_LIMIT: usize = 4096;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Cookie value could not be decoded: {0}")]
    Decode(#[from] CookieError),
    #[error("Appointment list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a flush. `near_limit` is set once the written cookie reaches the
/// warning threshold; past [`COOKIE_SIZE_LIMIT`] browsers drop it silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub bytes: usize,
    pub near_limit: bool,
}

/// Keeps the whole appointment list as JSON in a single cookie.
#[derive(Debug, Clone)]
pub struct CookiePersistence<S: CookieStore> {
    store: S,
    cookie_name: String,
    expiry_days: i64,
    size_warning_bytes: usize,
}

impl<S: CookieStore> CookiePersistence<S> {
    pub fn new(store: S, cookie_name: String, expiry_days: i64, size_warning_bytes: usize) -> Self {
        Self {
            store,
            cookie_name,
            expiry_days,
            size_warning_bytes,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes the whole list to the cookie. If the list can't be serialized
    /// nothing is written, so the previously stored list stays intact.
    pub fn save(&self, appointments: &[Appointment]) -> Result<SaveReport, PersistenceError> {
        let json = serde_json::to_string(appointments)?;

        let bytes = self.cookie_name.len() + 1 + percent_encode(&json).len();
        let near_limit = bytes >= self.size_warning_bytes;
        if near_limit {
            warn!(
                bytes,
                limit = COOKIE_SIZE_LIMIT,
                "Appointment cookie is close to the browser size limit"
            );
        }

        let expires = Utc::now() + Duration::days(self.expiry_days);
        self.store
            .write(Cookie::new(self.cookie_name.clone(), json, expires));

        Ok(SaveReport { bytes, near_limit })
    }

    /// Loads the persisted list. A missing cookie is an empty list, and so is
    /// a cookie that can't be decoded.
    pub fn load(&self) -> Vec<Appointment> {
        match self.try_load() {
            Ok(appointments) => appointments,
            Err(err) => {
                error!(%err, cookie = %self.cookie_name, "Failed to read appointments from cookie");
                vec![]
            }
        }
    }

    /// Looks a single appointment up in the persisted list.
    pub fn find(&self, id: AppointmentId) -> Option<Appointment> {
        match self.try_load() {
            Ok(appointments) => appointments.into_iter().find(|a| a.id == id),
            Err(err) => {
                error!(%err, %id, "Failed to read appointments from cookie for editing");
                None
            }
        }
    }

    fn try_load(&self) -> Result<Vec<Appointment>, PersistenceError> {
        let Some(wire_value) = self.store.read(&self.cookie_name) else {
            return Ok(vec![]);
        };
        if wire_value.is_empty() {
            return Ok(vec![]);
        }
        let json = percent_decode(&wire_value)?;
        Ok(serde_json::from_str(&json)?)
    }
}
