//! REST handlers.
//!
//! Handlers translate between wire types and core services. Business outcomes map to status
//! codes: `409` for a refused request, `404` for unknown records or request ids.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use clinic_api_shared::{
    ClinicRes, ConfirmRes, CreateClinicReq, CreateDoctorReq, CreateUserReq, DoctorRes, ErrorRes,
    HealthRes, HealthService, LedgerRes, LinkDoctorReq, ListUsersRes, RejectRes,
    SubmitRequestReq, SubmitRequestRes, UpdateUserReq, UserRes,
};
use clinic_core::{ConfirmOutcome, RejectOutcome, RequestOutcome};

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Liveness probe.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = ListUsersRes),
        (status = 503, description = "Store unavailable", body = ErrorRes)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<ListUsersRes>> {
    let users = state.users.list_users()?;
    Ok(Json(ListUsersRes {
        users: users.into_iter().map(UserRes::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created", body = UserRes),
        (status = 400, description = "Blank field", body = ErrorRes)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserReq>,
) -> ApiResult<(StatusCode, Json<UserRes>)> {
    let user = state.users.add_user(&req.name, &req.login, &req.birth)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "User updated", body = UserRes),
        (status = 400, description = "Empty update or blank field", body = ErrorRes),
        (status = 404, description = "Unknown user", body = ErrorRes)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserReq>,
) -> ApiResult<Json<UserRes>> {
    match state.users.update_user(&id, req.into())? {
        Some(user) => Ok(Json(user.into())),
        None => Err(ApiError::NotFound(format!("user {id}"))),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Unknown user", body = ErrorRes)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.users.delete_user(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("user {id}")))
    }
}

#[utoipa::path(
    post,
    path = "/users/{id}/doctors",
    params(("id" = String, Path, description = "User id")),
    request_body = LinkDoctorReq,
    responses(
        (status = 200, description = "Doctor linked", body = UserRes),
        (status = 400, description = "Unknown doctor", body = ErrorRes),
        (status = 404, description = "Unknown user", body = ErrorRes)
    )
)]
pub async fn link_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<LinkDoctorReq>,
) -> ApiResult<Json<UserRes>> {
    match state.users.link_doctor(&id, &req.doctor_id)? {
        Some(user) => Ok(Json(user.into())),
        None => Err(ApiError::NotFound(format!("user {id}"))),
    }
}

// ---------------------------------------------------------------------------
// Doctors and clinics
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/doctors",
    request_body = CreateDoctorReq,
    responses(
        (status = 201, description = "Doctor created with an empty ledger", body = DoctorRes),
        (status = 400, description = "Blank field or unknown clinic", body = ErrorRes)
    )
)]
pub async fn create_doctor(
    State(state): State<AppState>,
    Json(req): Json<CreateDoctorReq>,
) -> ApiResult<(StatusCode, Json<DoctorRes>)> {
    let doctor =
        state
            .doctors
            .add_doctor(&req.name, &req.speciality, req.clinic_id.as_deref())?;
    Ok((StatusCode::CREATED, Json(doctor.into())))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor", body = DoctorRes),
        (status = 404, description = "Unknown doctor", body = ErrorRes)
    )
)]
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DoctorRes>> {
    state
        .doctors
        .get_doctor(&id)?
        .map(|doctor| Json(doctor.into()))
        .ok_or_else(|| ApiError::NotFound(format!("doctor {id}")))
}

#[utoipa::path(
    post,
    path = "/clinics",
    request_body = CreateClinicReq,
    responses(
        (status = 201, description = "Clinic created", body = ClinicRes),
        (status = 400, description = "Blank field", body = ErrorRes)
    )
)]
pub async fn create_clinic(
    State(state): State<AppState>,
    Json(req): Json<CreateClinicReq>,
) -> ApiResult<(StatusCode, Json<ClinicRes>)> {
    let clinic = state.clinics.add_clinic(&req.name, &req.address)?;
    Ok((StatusCode::CREATED, Json(clinic.into())))
}

#[utoipa::path(
    get,
    path = "/clinics/{id}",
    params(("id" = String, Path, description = "Clinic id")),
    responses(
        (status = 200, description = "Clinic", body = ClinicRes),
        (status = 404, description = "Unknown clinic", body = ErrorRes)
    )
)]
pub async fn get_clinic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ClinicRes>> {
    state
        .clinics
        .get_clinic(&id)?
        .map(|clinic| Json(clinic.into()))
        .ok_or_else(|| ApiError::NotFound(format!("clinic {id}")))
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/doctors/{id}/appointments",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Pending requests and confirmed appointments", body = LedgerRes)
    )
)]
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LedgerRes>> {
    let ledger = state.appointments.ledger(&id)?;
    Ok(Json(ledger.into()))
}

#[utoipa::path(
    post,
    path = "/doctors/{id}/requests",
    params(("id" = String, Path, description = "Doctor id")),
    request_body = SubmitRequestReq,
    responses(
        (status = 201, description = "Request accepted", body = SubmitRequestRes),
        (status = 400, description = "Blank date, time or user id", body = ErrorRes),
        (status = 409, description = "SlotTaken or DuplicateUserDate", body = ErrorRes),
        (status = 503, description = "Store unavailable, safe to retry", body = ErrorRes)
    )
)]
pub async fn submit_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequestReq>,
) -> ApiResult<(StatusCode, Json<SubmitRequestRes>)> {
    match state
        .appointments
        .submit_request(&id, &req.date, &req.time, &req.user_id)?
    {
        RequestOutcome::Accepted(request_id) => Ok((
            StatusCode::CREATED,
            Json(SubmitRequestRes {
                request_id: request_id.to_string(),
            }),
        )),
        RequestOutcome::Rejected(reason) => Err(ApiError::Rejected(reason)),
    }
}

#[utoipa::path(
    post,
    path = "/doctors/{id}/requests/{request_id}/confirm",
    params(
        ("id" = String, Path, description = "Doctor id"),
        ("request_id" = String, Path, description = "Pending request id")
    ),
    responses(
        (status = 200, description = "Request confirmed", body = ConfirmRes),
        (status = 404, description = "No such pending request", body = ErrorRes)
    )
)]
pub async fn confirm_request(
    State(state): State<AppState>,
    Path((id, request_id)): Path<(String, String)>,
) -> ApiResult<Json<ConfirmRes>> {
    match state.appointments.confirm(&id, &request_id)? {
        ConfirmOutcome::Confirmed(confirmation) => Ok(Json(ConfirmRes {
            confirmation: confirmation.into(),
        })),
        ConfirmOutcome::NotFound => Err(ApiError::NotFound(format!("request {request_id}"))),
    }
}

#[utoipa::path(
    post,
    path = "/doctors/{id}/requests/{request_id}/reject",
    params(
        ("id" = String, Path, description = "Doctor id"),
        ("request_id" = String, Path, description = "Pending request id")
    ),
    responses(
        (status = 200, description = "Request rejected", body = RejectRes),
        (status = 404, description = "No such pending request", body = ErrorRes)
    )
)]
pub async fn reject_request(
    State(state): State<AppState>,
    Path((id, request_id)): Path<(String, String)>,
) -> ApiResult<Json<RejectRes>> {
    match state.appointments.reject(&id, &request_id)? {
        RejectOutcome::Rejected(request) => Ok(Json(RejectRes {
            request: request.into(),
        })),
        RejectOutcome::NotFound => Err(ApiError::NotFound(format!("request {request_id}"))),
    }
}
