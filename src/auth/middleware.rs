use actix_web::FromRequest;
use actix_web::error::InternalError;
use actix_web::{Error, HttpRequest, HttpResponse, dev::Payload, web};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::auth::jwt::TokenValidator;
use crate::db::users::find_or_create_from_auth;
use crate::models::users::{self, CreateUserFromAuth};

pub struct AuthenticatedUser(pub users::Model);

/// 401 with the same `{success, message}` body as every other error.
fn unauthorized(message: impl Into<String>) -> Error {
    let message = message.into();
    let response = HttpResponse::Unauthorized().json(json!({
        "success": false,
        "message": message,
    }));
    InternalError::from_response(message, response).into()
}

fn server_error(message: &'static str) -> Error {
    let response = HttpResponse::InternalServerError().json(json!({
        "success": false,
        "message": message,
    }));
    InternalError::from_response(message, response).into()
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| unauthorized("Missing Authorization header"))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| unauthorized("Authorization header must be: Bearer <token>"))?;

            // 2. Get the token validator from app data.
            let validator = req
                .app_data::<web::Data<Arc<TokenValidator>>>()
                .ok_or_else(|| server_error("Token validator not configured"))?;

            // 3. Validate the token.
            let claims = validator
                .validate_token(token)
                .await
                .map_err(|e| unauthorized(format!("Invalid token: {e}")))?;

            // 4. Extract user info from claims.
            let user_id = claims.user_id().map_err(unauthorized)?;

            let email = claims
                .user_email()
                .ok_or_else(|| unauthorized("No email in token claims"))?;

            // 5. Get the database connection.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| server_error("Database not configured"))?;

            // 6. Find or create the user.
            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    display_name: claims.display_name(),
                    role: claims.school_role(),
                },
            )
            .await
            .map_err(|e| {
                tracing::error!("failed to load user {user_id}: {e}");
                server_error("Database error")
            })?;

            Ok(AuthenticatedUser(user))
        })
    }
}

impl AuthenticatedUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}
