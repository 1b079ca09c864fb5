use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repository::AuthRepository;
use service::auth::AuthService;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<dyn AuthRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn AuthRepository>) -> Self {
        Self { auth: Arc::new(AuthService::new(repo)) }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SignupOutput {
    pub id: String,
}

#[derive(Serialize, ToSchema)]
pub struct SigninOutput {
    pub message: String,
    pub user_id: String,
}

pub const SIGNIN_MESSAGE: &str = "Login successful";

#[utoipa::path(post, path = "/signup", tag = "auth", request_body = crate::openapi::SignupRequest, responses((status = 201, description = "Registered", body = SignupOutput), (status = 400, description = "Bad Request"), (status = 409, description = "Email already registered"), (status = 500, description = "Store unavailable")))]
pub async fn signup(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupOutput>), ApiError> {
    let Json(input) = payload?;
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(SignupOutput { id: user.id })))
}

#[utoipa::path(post, path = "/signin", tag = "auth", request_body = crate::openapi::SigninRequest, responses((status = 200, description = "Logged In", body = SigninOutput), (status = 400, description = "Bad Request"), (status = 401, description = "Invalid credentials"), (status = 404, description = "User not found"), (status = 500, description = "Store unavailable")))]
pub async fn signin(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<SigninOutput>, ApiError> {
    let Json(input) = payload?;
    let user = state.auth.authenticate(input).await?;
    Ok(Json(SigninOutput { message: SIGNIN_MESSAGE.to_string(), user_id: user.id }))
}
