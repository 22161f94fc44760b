use crate::{
    clock::SystemClock,
    configuration::Configuration,
    controller::{ControllerError, FormController, SubmitOutcome},
    local_cookies::LocalCookies,
    persistence::CookiePersistence,
    render::render_page,
    types::AppointmentId,
    validation::AppointmentForm,
};
use axum::{
    extract::State,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, warn};

type Controller = FormController<LocalCookies, SystemClock>;

#[derive(Clone)]
pub struct AppState<T: Configuration> {
    configuration: T,
}

/// Body of the per-row edit button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowAction {
    id: String,
}

/// Body of a delete button: the row id plus the main form it submits, so the
/// client-side form state survives the round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    id: String,
    #[serde(flatten)]
    form: AppointmentForm,
}

pub fn create_app<T: Configuration>(configuration: T) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(get_page))
        .route("/submit", post(submit))
        .route("/edit", post(start_edit))
        .route("/cancel", post(cancel_edit))
        .route("/delete", post(delete_row))
        .with_state(AppState { configuration })
        .layer(cors)
}

impl<T: Configuration> AppState<T> {
    /// Builds a controller around the appointments the browser sent along.
    fn controller(&self, headers: &HeaderMap) -> Controller {
        let cookie_header = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");

        let persistence = CookiePersistence::new(
            LocalCookies::from_header(&cookie_header),
            self.configuration.cookie_name(),
            self.configuration.expiry_days(),
            self.configuration.size_warning_bytes(),
        );
        FormController::new(persistence, SystemClock)
    }

    fn respond(&self, controller: &Controller, status: StatusCode) -> Response {
        let page = render_page(&controller.page(&self.configuration.website_title()));
        let mut response = (status, Html(page)).into_response();

        for header in controller.store().set_cookie_headers() {
            match HeaderValue::from_str(&header) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(err) => error!(?err, "Failed to build Set-Cookie header"),
            }
        }
        response
    }
}

fn error_status(err: &ControllerError) -> StatusCode {
    match err {
        ControllerError::NotFound(_) => StatusCode::NOT_FOUND,
        ControllerError::EditTargetMissing(_) => StatusCode::CONFLICT,
    }
}

fn parse_row_id(id: &str) -> Option<AppointmentId> {
    match id.parse() {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(%err, "Ignoring row action with malformed id");
            None
        }
    }
}

async fn get_page<T: Configuration>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let controller = state.controller(&headers);
    state.respond(&controller, StatusCode::OK)
}

async fn submit<T: Configuration>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
    Form(form): Form<AppointmentForm>,
) -> impl IntoResponse {
    let mut controller = state.controller(&headers);
    controller.restore_form(form.clone());

    let status = match controller.submit(form) {
        Ok(SubmitOutcome::Invalid) => StatusCode::UNPROCESSABLE_ENTITY,
        Ok(outcome) => {
            debug!(?outcome, "Form submitted");
            StatusCode::OK
        }
        Err(err) => error_status(&err),
    };
    state.respond(&controller, status)
}

async fn start_edit<T: Configuration>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
    Form(action): Form<RowAction>,
) -> impl IntoResponse {
    let mut controller = state.controller(&headers);
    let Some(id) = parse_row_id(&action.id) else {
        return state.respond(&controller, StatusCode::BAD_REQUEST);
    };

    let status = match controller.start_edit(id) {
        Ok(()) => StatusCode::OK,
        Err(err) => error_status(&err),
    };
    state.respond(&controller, status)
}

async fn cancel_edit<T: Configuration>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let mut controller = state.controller(&headers);
    controller.cancel_edit();
    state.respond(&controller, StatusCode::OK)
}

async fn delete_row<T: Configuration>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
    Form(request): Form<DeleteRequest>,
) -> impl IntoResponse {
    let mut controller = state.controller(&headers);
    controller.restore_form(request.form);
    let Some(id) = parse_row_id(&request.id) else {
        return state.respond(&controller, StatusCode::BAD_REQUEST);
    };

    controller.delete_row(id);
    state.respond(&controller, StatusCode::OK)
}
