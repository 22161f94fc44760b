use crate::{
    types::{Appointment, AppointmentId},
    validation::{AppointmentForm, FormField, ValidationReport},
};
use std::fmt::Write;

pub const EMPTY_TABLE: &str = "No appointments yet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based position in the list.
    pub index: usize,
    pub id: AppointmentId,
    pub scheduled_at: String,
    pub patient_name: String,
    pub national_id: String,
    pub phone: String,
    pub birth_date: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    Empty,
    Rows(Vec<TableRow>),
}

/// Projects the list onto table rows, in list order.
pub fn render(appointments: &[Appointment]) -> TableView {
    if appointments.is_empty() {
        return TableView::Empty;
    }

    let rows = appointments
        .iter()
        .enumerate()
        .map(|(i, appointment)| TableRow {
            index: i + 1,
            id: appointment.id,
            scheduled_at: appointment.scheduled_at.to_string(),
            patient_name: appointment.patient_name.to_string(),
            national_id: appointment.national_id.clone(),
            phone: appointment.phone.clone(),
            birth_date: appointment.birth_date.clone(),
            notes: appointment.notes.clone().unwrap_or_default(),
        })
        .collect();
    TableView::Rows(rows)
}

/// Everything the page shows at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub title: String,
    pub form: AppointmentForm,
    pub errors: ValidationReport,
    pub banner: Option<String>,
    pub notice: Option<String>,
    pub storage_warning: Option<String>,
    pub submit_label: String,
    pub cancel_enabled: bool,
    pub table: TableView,
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn input(page: &mut String, view: &PageView, field: FormField, label: &str, value: &str) {
    let name = field.name();
    let error = view.errors.message(field);
    let class = if error.is_some() { "field invalid" } else { "field" };
    let _ = write!(
        page,
        r#"<div class="{class}"><label for="{name}">{label}</label><input id="{name}" name="{name}" value="{value}"><small id="error-{name}" class="error">{error}</small></div>"#,
        value = escape_html(value),
        error = escape_html(error.unwrap_or_default()),
    );
}

fn edit_button(page: &mut String, id: AppointmentId) {
    let _ = write!(
        page,
        r#"<form method="post" action="/edit" class="inline"><input type="hidden" name="id" value="{id}"><button type="submit" data-id="{id}" class="btn-edit">Edit</button></form>"#
    );
}

/// Submits the main form along with the row id, so an edit in progress
/// survives deleting some other row.
fn delete_button(page: &mut String, id: AppointmentId) {
    let _ = write!(
        page,
        r#"<button type="submit" form="appointment-form" formaction="/delete" formnovalidate name="id" value="{id}" data-id="{id}" class="btn-delete">Delete</button>"#
    );
}

fn table(page: &mut String, table: &TableView) {
    page.push_str(
        "<table><thead><tr><th>#</th><th>Date</th><th>Patient</th><th>National ID</th>\
         <th>Phone</th><th>Birth date</th><th>Notes</th><th></th></tr></thead><tbody id=\"appointments\">",
    );
    match table {
        TableView::Empty => {
            let _ = write!(
                page,
                r#"<tr id="empty-row"><td colspan="8">{EMPTY_TABLE}</td></tr>"#
            );
        }
        TableView::Rows(rows) => {
            for row in rows {
                let _ = write!(
                    page,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>",
                    row.index,
                    escape_html(&row.scheduled_at),
                    escape_html(&row.patient_name),
                    escape_html(&row.national_id),
                    escape_html(&row.phone),
                    escape_html(&row.birth_date),
                    escape_html(&row.notes),
                );
                edit_button(page, row.id);
                delete_button(page, row.id);
                page.push_str("</td></tr>");
            }
        }
    }
    page.push_str("</tbody></table>");
}

/// Renders the full HTML page. Output depends only on `view`, and every
/// user-supplied string is escaped.
pub fn render_page(view: &PageView) -> String {
    let form = &view.form;
    let mut page = String::new();
    let _ = write!(
        page,
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{title}</title></head><body><h1>{title}</h1>"#,
        title = escape_html(&view.title)
    );

    if let Some(notice) = &view.notice {
        let _ = write!(page, r#"<p id="notice" role="alert">{}</p>"#, escape_html(notice));
    }
    if let Some(warning) = &view.storage_warning {
        let _ = write!(page, r#"<p id="storage-warning">{}</p>"#, escape_html(warning));
    }
    match &view.banner {
        Some(banner) => {
            let _ = write!(page, r#"<div id="form-alert">{}</div>"#, escape_html(banner));
        }
        None => page.push_str(r#"<div id="form-alert" hidden></div>"#),
    }

    page.push_str(r#"<form id="appointment-form" method="post" action="/submit">"#);
    let _ = write!(
        page,
        r#"<input type="hidden" id="edit_id" name="edit_id" value="{}">"#,
        escape_html(&form.edit_id)
    );
    input(&mut page, view, FormField::Day, "Day", &form.day);
    input(&mut page, view, FormField::Month, "Month", &form.month);
    input(&mut page, view, FormField::Year, "Year", &form.year);
    input(&mut page, view, FormField::Hour, "Hour", &form.hour);
    input(&mut page, view, FormField::Minute, "Minute", &form.minute);
    input(&mut page, view, FormField::FirstName, "First name", &form.first_name);
    input(&mut page, view, FormField::Surnames, "Surnames", &form.surnames);
    input(&mut page, view, FormField::NationalId, "National ID", &form.national_id);
    input(&mut page, view, FormField::Phone, "Phone", &form.phone);
    input(&mut page, view, FormField::BirthDate, "Birth date", &form.birth_date);
    let _ = write!(
        page,
        r#"<div class="field"><label for="notes">Notes</label><textarea id="notes" name="notes">{}</textarea></div>"#,
        escape_html(&form.notes)
    );
    let _ = write!(
        page,
        r#"<button type="submit" id="btn-save">{}</button></form>"#,
        escape_html(&view.submit_label)
    );

    let disabled = if view.cancel_enabled { "" } else { " disabled" };
    let _ = write!(
        page,
        r#"<form method="post" action="/cancel"><button type="submit" id="btn-cancel"{disabled}>Cancel</button></form>"#
    );

    table(&mut page, &view.table);
    page.push_str("</body></html>");
    page
}
