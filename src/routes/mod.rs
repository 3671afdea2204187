// Suffixed with _mod so a module never shares a name with one of the route functions it exports,
// which confuses rocket::routes!.
mod index_mod;
mod emissions_mod;
mod mines_mod;
mod operations_mod;
mod users_mod;

pub use index_mod::*;
pub use emissions_mod::*;
pub use mines_mod::*;
pub use operations_mod::*;
pub use users_mod::*;

use log::error;
use rocket::serde::json::Json;
use serde::Serialize;

use minecarbon::auth::AuthError;
use minecarbon::validate::ValidationError;
use minecarbon::CoreError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(ErrorBody { error: message.into(), field: None })
    }
}

#[derive(Debug, rocket::Responder)]
pub enum ApiError {
    #[response(status = 400)]
    BadRequest(Json<ErrorBody>),

    #[response(status = 401)]
    Unauthorized(Json<ErrorBody>),

    #[response(status = 403)]
    Forbidden(Json<ErrorBody>),

    #[response(status = 404)]
    NotFound(Json<ErrorBody>),

    #[response(status = 409)]
    Conflict(Json<ErrorBody>),

    #[response(status = 500)]
    InternalError(Json<ErrorBody>),
}

fn capitalized(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(Json(ErrorBody {
            field: Some(err.field().to_string()),
            error: err.to_string(),
        }))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) => ApiError::Unauthorized(ErrorBody::new("Please authenticate")),
            AuthError::Forbidden { .. } => ApiError::Forbidden(ErrorBody::new(err.to_string())),
            AuthError::Hashing(_) | AuthError::Signing(_) | AuthError::NotConfigured => {
                error!("{}", err);
                ApiError::InternalError(ErrorBody::new("Internal server error"))
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::NotFound { entity, .. } => ApiError::NotFound(ErrorBody::new(format!("{} not found", capitalized(entity)))),
            // Already logged with its source where the store call failed
            CoreError::Storage { operation, entity, .. } => ApiError::InternalError(ErrorBody::new(format!("Error trying to {} {}", operation, entity))),
            CoreError::NonFiniteTotal { .. } => ApiError::BadRequest(ErrorBody::new(err.to_string())),
            CoreError::Conflict(message) => ApiError::Conflict(ErrorBody::new(message)),
            CoreError::InvalidCredentials => ApiError::Unauthorized(ErrorBody::new(err.to_string())),
            CoreError::Auth(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        match ApiError::from(CoreError::not_found("mine", 3)) {
            ApiError::NotFound(body) => assert_eq!(body.error, "Mine not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn validation_errors_carry_the_field() {
        let err = ValidationError::Negative { field: "fuelUsed".to_string() };
        match ApiError::from(CoreError::from(err)) {
            ApiError::BadRequest(body) => assert_eq!(body.field.as_deref(), Some("fuelUsed")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn signing_failures_are_server_errors() {
        match ApiError::from(AuthError::Signing("key rejected".to_string())) {
            ApiError::InternalError(body) => assert_eq!(body.error, "Internal server error"),
            other => panic!("Expected InternalError, got {:?}", other),
        }
    }

    #[test]
    fn mine_filter_must_be_an_id() {
        match ApiError::from(minecarbon::validate::optional_id_param("mine_id", Some("abc")).unwrap_err()) {
            ApiError::BadRequest(body) => assert_eq!(body.field.as_deref(), Some("mine_id")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn bad_tokens_ask_for_authentication() {
        match ApiError::from(AuthError::InvalidToken("expired".to_string())) {
            ApiError::Unauthorized(body) => assert_eq!(body.error, "Please authenticate"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }
}
