use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::routes::auth::{SigninOutput, SignupOutput};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RunningResponse { pub msg: String }

#[derive(ToSchema)]
pub struct SignupRequest { pub username: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct SigninRequest { pub email: String, pub password: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::root,
        crate::routes::auth::signup,
        crate::routes::auth::signin,
    ),
    components(
        schemas(
            HealthResponse,
            RunningResponse,
            SignupRequest,
            SigninRequest,
            SignupOutput,
            SigninOutput,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth")
    )
)]
pub struct ApiDoc;
