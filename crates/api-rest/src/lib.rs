//! # API REST
//!
//! REST API for the clinic scheduling service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation, served as JSON at `/api-docs/openapi.json`
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `clinic-api-shared` for wire types and `clinic-core` for all business logic.

#![warn(rust_2018_idioms)]

pub mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use clinic_api_shared::{
    AppointmentEntry, ClinicRes, ConfirmRes, CreateClinicReq, CreateDoctorReq, CreateUserReq,
    DoctorRes, ErrorRes, HealthRes, LedgerRes, LinkDoctorReq, ListUsersRes, RejectRes,
    SubmitRequestReq, SubmitRequestRes, UpdateUserReq, UserRes,
};
use clinic_core::{AppointmentService, ClinicService, DocumentStore, DoctorService, UserService};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

pub use error::ApiError;

/// Services shared across REST handlers.
///
/// Every service holds the same store handle, opened once at startup.
#[derive(Clone)]
pub struct AppState {
    pub appointments: AppointmentService,
    pub users: UserService,
    pub doctors: DoctorService,
    pub clinics: ClinicService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            appointments: AppointmentService::new(store.clone()),
            users: UserService::new(store.clone()),
            doctors: DoctorService::new(store.clone()),
            clinics: ClinicService::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_users,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::link_doctor,
        handlers::create_doctor,
        handlers::get_doctor,
        handlers::create_clinic,
        handlers::get_clinic,
        handlers::get_ledger,
        handlers::submit_request,
        handlers::confirm_request,
        handlers::reject_request
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        CreateUserReq,
        UpdateUserReq,
        LinkDoctorReq,
        UserRes,
        ListUsersRes,
        CreateDoctorReq,
        DoctorRes,
        CreateClinicReq,
        ClinicRes,
        SubmitRequestReq,
        SubmitRequestRes,
        AppointmentEntry,
        LedgerRes,
        ConfirmRes,
        RejectRes
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Builds the REST router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/:id",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .route("/users/:id/doctors", post(handlers::link_doctor))
        .route("/doctors", post(handlers::create_doctor))
        .route("/doctors/:id", get(handlers::get_doctor))
        .route("/doctors/:id/appointments", get(handlers::get_ledger))
        .route("/doctors/:id/requests", post(handlers::submit_request))
        .route(
            "/doctors/:id/requests/:request_id/confirm",
            post(handlers::confirm_request),
        )
        .route(
            "/doctors/:id/requests/:request_id/reject",
            post(handlers::reject_request),
        )
        .route("/clinics", post(handlers::create_clinic))
        .route("/clinics/:id", get(handlers::get_clinic))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
