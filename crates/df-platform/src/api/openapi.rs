//! OpenAPI Documentation

use utoipa::OpenApi;

use crate::api::auth;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DealFlow Platform API",
        description = "Deal pipeline backend: session lifecycle, user administration, and deal management",
        version = "0.1.0"
    ),
    paths(
        auth::login,
        auth::refresh,
        auth::logout,
    ),
    components(schemas(
        auth::LoginRequest,
        auth::AuthResponse,
        auth::RefreshTokenRequest,
    )),
    tags(
        (name = "auth", description = "Session lifecycle: login, refresh-token rotation, logout")
    )
)]
pub struct PlatformApiDoc;
