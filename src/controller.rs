use crate::{
    backend::CookieStore,
    clock::{fresh_id, Clock},
    persistence::{CookiePersistence, COOKIE_SIZE_LIMIT},
    render::{render, PageView, TableView},
    types::{Appointment, AppointmentId},
    validation::{build_appointment, AppointmentForm, ValidationReport, BANNER},
};
use thiserror::Error;
use tracing::{error, info, warn};

pub const SAVE_APPOINTMENT: &str = "Save appointment";
pub const SAVE_CHANGES: &str = "Save changes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Editing(AppointmentId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Appointment {0} could not be loaded from the cookie.")]
    NotFound(AppointmentId),
    #[error("Appointment {0} no longer exists, so the changes were not saved.")]
    EditTargetMissing(AppointmentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(AppointmentId),
    Updated(AppointmentId),
    Invalid,
}

/// Owns the appointment list and the form state, and keeps the cookie in
/// step with the list: every mutation is followed by a full flush.
pub struct FormController<S: CookieStore, C: Clock> {
    persistence: CookiePersistence<S>,
    clock: C,
    appointments: Vec<Appointment>,
    mode: FormMode,
    form: AppointmentForm,
    errors: ValidationReport,
    banner: Option<String>,
    notice: Option<String>,
    storage_warning: Option<String>,
}

impl<S: CookieStore, C: Clock> FormController<S, C> {
    /// Loads the persisted list and starts in create mode with an empty form.
    pub fn new(persistence: CookiePersistence<S>, clock: C) -> Self {
        let appointments = persistence.load();
        Self {
            persistence,
            clock,
            appointments,
            mode: FormMode::Create,
            form: AppointmentForm::default(),
            errors: ValidationReport::default(),
            banner: None,
            notice: None,
            storage_warning: None,
        }
    }

    /// Puts back form state that lives on the client between requests. A
    /// parseable hidden `edit_id` puts the controller in editing mode.
    pub fn restore_form(&mut self, form: AppointmentForm) {
        self.mode = match form.edit_id.parse::<AppointmentId>() {
            Ok(id) => FormMode::Editing(id),
            Err(_) => FormMode::Create,
        };
        self.form = form;
    }

    pub fn start_edit(&mut self, id: AppointmentId) -> Result<(), ControllerError> {
        // Read from the cookie rather than the in-memory list.
        let Some(appointment) = self.persistence.find(id) else {
            let err = ControllerError::NotFound(id);
            warn!(%id, "Appointment to edit not found in cookie");
            self.notice = Some(err.to_string());
            return Err(err);
        };

        self.form = AppointmentForm::from_appointment(&appointment);
        self.mode = FormMode::Editing(id);
        self.errors = ValidationReport::default();
        self.banner = None;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.mode = FormMode::Create;
        self.errors = ValidationReport::default();
        self.banner = None;
        self.form = AppointmentForm::default();
    }

    pub fn submit(&mut self, form: AppointmentForm) -> Result<SubmitOutcome, ControllerError> {
        self.form = form;
        self.form.edit_id = match self.mode {
            FormMode::Editing(id) => id.to_string(),
            FormMode::Create => String::new(),
        };
        self.errors = ValidationReport::default();
        self.banner = None;

        let id = match self.mode {
            FormMode::Editing(id) => id,
            FormMode::Create => fresh_id(self.clock.now_millis(), &self.appointments),
        };

        let appointment = match build_appointment(&self.form, id) {
            Ok(appointment) => appointment,
            Err(report) => {
                self.errors = report;
                self.banner = Some(BANNER.into());
                return Ok(SubmitOutcome::Invalid);
            }
        };

        match self.mode {
            FormMode::Editing(id) => {
                let Some(index) = self.appointments.iter().position(|a| a.id == id) else {
                    let err = ControllerError::EditTargetMissing(id);
                    warn!(%id, "Edited appointment was deleted before saving");
                    self.notice = Some(err.to_string());
                    self.mode = FormMode::Create;
                    self.form.edit_id.clear();
                    return Err(err);
                };
                self.appointments[index] = appointment;
                self.flush();
                self.cancel_edit();
                info!(%id, "Appointment updated");
                Ok(SubmitOutcome::Updated(id))
            }
            FormMode::Create => {
                self.appointments.push(appointment);
                self.flush();
                self.form = AppointmentForm::default();
                info!(%id, "Appointment created");
                Ok(SubmitOutcome::Created(id))
            }
        }
    }

    /// Removes the appointment with `id`, if any. The mode is left alone, so
    /// deleting the edit target leaves the form populated.
    pub fn delete_row(&mut self, id: AppointmentId) -> bool {
        let before = self.appointments.len();
        self.appointments.retain(|a| a.id != id);
        let removed = self.appointments.len() != before;
        self.flush();

        if removed {
            info!(%id, "Appointment deleted");
        }
        removed
    }

    fn flush(&mut self) {
        let report = match self.persistence.save(&self.appointments) {
            Ok(report) => report,
            Err(err) => {
                error!(%err, "Failed to save appointments, cookie left unchanged");
                return;
            }
        };
        self.storage_warning = report.near_limit.then(|| {
            format!(
                "Stored appointments use {} of about {} bytes the browser keeps. Delete old appointments before adding more.",
                report.bytes, COOKIE_SIZE_LIMIT
            )
        });
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn form(&self) -> &AppointmentForm {
        &self.form
    }

    pub fn errors(&self) -> &ValidationReport {
        &self.errors
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => SAVE_APPOINTMENT,
            FormMode::Editing(_) => SAVE_CHANGES,
        }
    }

    pub fn cancel_enabled(&self) -> bool {
        matches!(self.mode, FormMode::Editing(_))
    }

    pub fn table(&self) -> TableView {
        render(&self.appointments)
    }

    pub fn page(&self, title: &str) -> PageView {
        PageView {
            title: title.to_string(),
            form: self.form.clone(),
            errors: self.errors.clone(),
            banner: self.banner.clone(),
            notice: self.notice.clone(),
            storage_warning: self.storage_warning.clone(),
            submit_label: self.submit_label().to_string(),
            cancel_enabled: self.cancel_enabled(),
            table: self.table(),
        }
    }
}
