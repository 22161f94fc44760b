use crate::types::{Appointment, AppointmentId, PatientName, ScheduledAt};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::BTreeMap, fmt};
use validator::{Validate, ValidationError};

pub const BANNER: &str = "Please review the fields marked in red.";

lazy_static! {
    static ref NATIONAL_ID: Regex = Regex::new(r"^[0-9]{8}[A-Za-z]$").unwrap();
    static ref DIGITS_ONLY: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

const MIN_PHONE_DIGITS: usize = 9;

/// The form exactly as the user typed it. Every field is text; the hidden
/// `edit_id` is empty unless an appointment is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentForm {
    pub day: String,
    pub month: String,
    pub year: String,
    pub hour: String,
    pub minute: String,
    pub first_name: String,
    pub surnames: String,
    pub national_id: String,
    pub phone: String,
    pub birth_date: String,
    pub notes: String,
    pub edit_id: String,
}

impl AppointmentForm {
    /// Fills the form from a stored appointment, splitting the structured
    /// date and name back into their separate inputs.
    pub fn from_appointment(appointment: &Appointment) -> Self {
        let ScheduledAt {
            day,
            month,
            year,
            hour,
            minute,
        } = appointment.scheduled_at;
        Self {
            day: day.to_string(),
            month: month.to_string(),
            year: year.to_string(),
            hour: hour.to_string(),
            minute: minute.to_string(),
            first_name: appointment.patient_name.first_name.clone(),
            surnames: appointment.patient_name.surnames.clone(),
            national_id: appointment.national_id.clone(),
            phone: appointment.phone.clone(),
            birth_date: appointment.birth_date.clone(),
            notes: appointment.notes.clone().unwrap_or_default(),
            edit_id: appointment.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Day,
    Month,
    Year,
    Hour,
    Minute,
    FirstName,
    Surnames,
    NationalId,
    Phone,
    BirthDate,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::Day,
        FormField::Month,
        FormField::Year,
        FormField::Hour,
        FormField::Minute,
        FormField::FirstName,
        FormField::Surnames,
        FormField::NationalId,
        FormField::Phone,
        FormField::BirthDate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormField::Day => "day",
            FormField::Month => "month",
            FormField::Year => "year",
            FormField::Hour => "hour",
            FormField::Minute => "minute",
            FormField::FirstName => "first_name",
            FormField::Surnames => "surnames",
            FormField::NationalId => "national_id",
            FormField::Phone => "phone",
            FormField::BirthDate => "birth_date",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field-level outcome of validating a form. Holds at most one message per
/// field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: BTreeMap<FormField, String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

/// Trimmed and parsed view of [`AppointmentForm`] that the rules run against.
#[derive(Debug, Validate)]
struct CheckedForm {
    #[validate(
        required(message = "Invalid day (1-31)."),
        range(min = 1, max = 31, message = "Invalid day (1-31).")
    )]
    day: Option<i32>,
    #[validate(
        required(message = "Invalid month (1-12)."),
        range(min = 1, max = 12, message = "Invalid month (1-12).")
    )]
    month: Option<i32>,
    #[validate(
        required(message = "Invalid year (1900-2100)."),
        range(min = 1900, max = 2100, message = "Invalid year (1900-2100).")
    )]
    year: Option<i32>,
    #[validate(
        required(message = "Invalid hour (0-23)."),
        range(min = 0, max = 23, message = "Invalid hour (0-23).")
    )]
    hour: Option<i32>,
    #[validate(
        required(message = "Invalid minute (0-59)."),
        range(min = 0, max = 59, message = "Invalid minute (0-59).")
    )]
    minute: Option<i32>,
    #[validate(length(min = 1, message = "First name is required."))]
    first_name: String,
    #[validate(length(min = 1, message = "Surname is required."))]
    surnames: String,
    #[validate(custom(function = "validate_national_id"))]
    national_id: String,
    #[validate(custom(function = "validate_phone"))]
    phone: String,
    #[validate(length(min = 1, message = "Birth date is required."))]
    birth_date: String,
    notes: String,
}

fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_national_id(national_id: &str) -> Result<(), ValidationError> {
    if national_id.is_empty() {
        return Err(rule_error("required", "National ID is required."));
    }
    if !NATIONAL_ID.is_match(national_id) {
        return Err(rule_error(
            "national_id_format",
            "Invalid national ID format (e.g. 12345678Z).",
        ));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !DIGITS_ONLY.is_match(phone) {
        return Err(rule_error("phone_digits", "Phone may only contain digits."));
    }
    if phone.chars().count() < MIN_PHONE_DIGITS {
        return Err(rule_error(
            "phone_length",
            "Phone must have at least 9 digits.",
        ));
    }
    Ok(())
}

impl From<&AppointmentForm> for CheckedForm {
    fn from(form: &AppointmentForm) -> Self {
        Self {
            day: parse_int(&form.day),
            month: parse_int(&form.month),
            year: parse_int(&form.year),
            hour: parse_int(&form.hour),
            minute: parse_int(&form.minute),
            first_name: form.first_name.trim().to_string(),
            surnames: form.surnames.trim().to_string(),
            national_id: form.national_id.trim().to_string(),
            phone: form.phone.trim().to_string(),
            birth_date: form.birth_date.trim().to_string(),
            notes: form.notes.trim().to_string(),
        }
    }
}

impl CheckedForm {
    fn report(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let Err(errors) = self.validate() else {
            return report;
        };

        for (name, field_errors) in errors.field_errors() {
            let (Some(field), Some(error)) = (FormField::from_name(&name), field_errors.first())
            else {
                continue;
            };
            let message = match &error.message {
                Some(message) => message.to_string(),
                None => error.code.to_string(),
            };
            report.errors.insert(field, message);
        }
        report
    }

    fn scheduled_at(&self) -> Option<ScheduledAt> {
        Some(ScheduledAt {
            day: u8::try_from(self.day?).ok()?,
            month: u8::try_from(self.month?).ok()?,
            year: u16::try_from(self.year?).ok()?,
            hour: u8::try_from(self.hour?).ok()?,
            minute: u8::try_from(self.minute?).ok()?,
        })
    }
}

/// Checks every rule in one pass and collects one message per failing field.
pub fn validate(form: &AppointmentForm) -> ValidationReport {
    CheckedForm::from(form).report()
}

/// Validates the form and, when every rule passes, builds the appointment it
/// describes under the given id.
pub fn build_appointment(
    form: &AppointmentForm,
    id: AppointmentId,
) -> Result<Appointment, ValidationReport> {
    let checked = CheckedForm::from(form);
    let report = checked.report();
    if !report.is_ok() {
        return Err(report);
    }
    let scheduled_at = checked.scheduled_at().ok_or(report)?;

    Ok(Appointment {
        id,
        scheduled_at,
        patient_name: PatientName {
            first_name: checked.first_name,
            surnames: checked.surnames,
        },
        national_id: checked.national_id,
        phone: checked.phone,
        birth_date: checked.birth_date,
        notes: (!checked.notes.is_empty()).then_some(checked.notes),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::valid_form;
    use test_case::test_case;

    fn with(mut form: AppointmentForm, apply: impl FnOnce(&mut AppointmentForm)) -> AppointmentForm {
        apply(&mut form);
        form
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(validate(&valid_form()).is_ok());
    }

    #[test_case(|f: &mut AppointmentForm| f.first_name = "   ".into(), FormField::FirstName, "First name is required.")]
    #[test_case(|f: &mut AppointmentForm| f.surnames = "".into(), FormField::Surnames, "Surname is required.")]
    #[test_case(|f: &mut AppointmentForm| f.national_id = " ".into(), FormField::NationalId, "National ID is required.")]
    #[test_case(|f: &mut AppointmentForm| f.national_id = "1234567Z".into(), FormField::NationalId, "Invalid national ID format (e.g. 12345678Z).")]
    #[test_case(|f: &mut AppointmentForm| f.birth_date = "\t".into(), FormField::BirthDate, "Birth date is required.")]
    #[test_case(|f: &mut AppointmentForm| f.day = "32".into(), FormField::Day, "Invalid day (1-31).")]
    #[test_case(|f: &mut AppointmentForm| f.day = "".into(), FormField::Day, "Invalid day (1-31).")]
    #[test_case(|f: &mut AppointmentForm| f.month = "0".into(), FormField::Month, "Invalid month (1-12).")]
    #[test_case(|f: &mut AppointmentForm| f.year = "1899".into(), FormField::Year, "Invalid year (1900-2100).")]
    #[test_case(|f: &mut AppointmentForm| f.hour = "24".into(), FormField::Hour, "Invalid hour (0-23).")]
    #[test_case(|f: &mut AppointmentForm| f.minute = "6o".into(), FormField::Minute, "Invalid minute (0-59).")]
    #[test_case(|f: &mut AppointmentForm| f.phone = "600-123-123".into(), FormField::Phone, "Phone may only contain digits.")]
    #[test_case(|f: &mut AppointmentForm| f.phone = "60012312".into(), FormField::Phone, "Phone must have at least 9 digits.")]
    #[test_case(|f: &mut AppointmentForm| f.phone = "٠١٢٣٤".into(), FormField::Phone, "Phone may only contain digits.")]
    #[test_case(|f: &mut AppointmentForm| f.national_id = "١٢٣٤٥٦٧٨Z".into(), FormField::NationalId, "Invalid national ID format (e.g. 12345678Z).")]
    fn test_single_rule_violation(
        apply: fn(&mut AppointmentForm),
        field: FormField,
        message: &str,
    ) {
        let report = validate(&with(valid_form(), apply));
        assert!(!report.is_ok());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.message(field), Some(message));
    }

    #[test]
    fn test_all_errors_collected_in_one_pass() {
        let report = validate(&AppointmentForm::default());
        for field in FormField::ALL {
            assert!(report.message(field).is_some(), "missing error for {field}");
        }
        assert_eq!(report.errors.len(), FormField::ALL.len());
    }

    #[test_case("12345678z")]
    #[test_case("  87654321X  ")]
    fn test_national_id_case_and_whitespace(national_id: &str) {
        let form = with(valid_form(), |f| f.national_id = national_id.into());
        assert!(validate(&form).is_ok());
    }

    #[test]
    fn test_impossible_calendar_date_is_accepted() {
        let form = with(valid_form(), |f| {
            f.day = "30".into();
            f.month = "2".into();
        });
        assert!(validate(&form).is_ok());
    }

    #[test]
    fn test_build_appointment_trims_and_drops_empty_notes() {
        let form = with(valid_form(), |f| {
            f.first_name = "  Ana ".into();
            f.phone = " 600123123 ".into();
            f.notes = "   ".into();
        });
        let appointment = build_appointment(&form, AppointmentId(7)).unwrap();
        assert_eq!(appointment.id, AppointmentId(7));
        assert_eq!(appointment.patient_name.first_name, "Ana");
        assert_eq!(appointment.phone, "600123123");
        assert_eq!(appointment.notes, None);
        assert_eq!(appointment.scheduled_at.to_string(), "15/6/2030 09:05");
    }

    #[test]
    fn test_build_appointment_reports_errors() {
        let form = with(valid_form(), |f| f.hour = "99".into());
        let report = build_appointment(&form, AppointmentId(7)).unwrap_err();
        assert_eq!(report.message(FormField::Hour), Some("Invalid hour (0-23)."));
    }

    #[test]
    fn test_form_from_appointment_round_trip() {
        let appointment = build_appointment(&valid_form(), AppointmentId(42)).unwrap();
        let form = AppointmentForm::from_appointment(&appointment);
        assert_eq!(form.edit_id, "42");
        assert_eq!(build_appointment(&form, AppointmentId(42)).unwrap(), appointment);
    }
}
