use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use crate::{
    backend::CookieStore,
    cookie::{percent_encode, Cookie},
    types::{Appointment, AppointmentId, PatientName, ScheduledAt},
    validation::AppointmentForm,
};

pub struct RecordingCookieStoreInner {
    pub calls_to_read: AtomicU64,
    pub calls_to_write: AtomicU64,
    pub written: Mutex<Vec<Cookie>>,
}

/// Cookie store that keeps every write, in order, and serves reads from the
/// latest write of each name.
#[derive(Clone)]
pub struct RecordingCookieStore(pub Arc<RecordingCookieStoreInner>);

impl RecordingCookieStore {
    pub fn new() -> Self {
        Self(Arc::new(RecordingCookieStoreInner {
            calls_to_read: AtomicU64::default(),
            calls_to_write: AtomicU64::default(),
            written: Mutex::default(),
        }))
    }

    pub fn written(&self) -> Vec<Cookie> {
        self.0.written.lock().unwrap().clone()
    }
}

impl CookieStore for RecordingCookieStore {
    fn read(&self, name: &str) -> Option<String> {
        self.0.calls_to_read.fetch_add(1, Ordering::SeqCst);
        self.0
            .written
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|cookie| cookie.name == name)
            .map(|cookie| percent_encode(&cookie.value))
    }

    fn write(&self, cookie: Cookie) {
        self.0.calls_to_write.fetch_add(1, Ordering::SeqCst);
        self.0.written.lock().unwrap().push(cookie);
    }
}

pub fn appointment(id: i64) -> Appointment {
    Appointment {
        id: AppointmentId(id),
        scheduled_at: ScheduledAt {
            day: 15,
            month: 6,
            year: 2030,
            hour: 9,
            minute: 5,
        },
        patient_name: PatientName {
            first_name: "Ana".into(),
            surnames: "Perez Gil".into(),
        },
        national_id: "12345678Z".into(),
        phone: "600123123".into(),
        birth_date: "1990-04-01".into(),
        notes: Some("Check-up".into()),
    }
}

pub fn valid_form() -> AppointmentForm {
    AppointmentForm {
        day: "15".into(),
        month: "6".into(),
        year: "2030".into(),
        hour: "9".into(),
        minute: "5".into(),
        first_name: "Ana".into(),
        surnames: "Perez Gil".into(),
        national_id: "12345678Z".into(),
        phone: "600123123".into(),
        birth_date: "1990-04-01".into(),
        notes: "Check-up".into(),
        edit_id: String::new(),
    }
}
