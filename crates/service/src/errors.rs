use thiserror::Error;

/// Business errors for all service workflows. Each variant maps onto one
/// HTTP status at the boundary via `status()`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found!", entity))
    }

    /// HTTP status carried by the error, consumed by the server boundary.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized(_) => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Hash(_) | ServiceError::Token(_) | ServiceError::Db(_) => 500,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => ServiceError::BadRequest(msg),
            models::errors::ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Db(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ServiceError::BadRequest("x".into()).status(), 400);
        assert_eq!(ServiceError::Unauthorized("x".into()).status(), 401);
        assert_eq!(ServiceError::Forbidden("x".into()).status(), 403);
        assert_eq!(ServiceError::not_found("Company").status(), 404);
        assert_eq!(ServiceError::Conflict("x".into()).status(), 409);
        assert_eq!(ServiceError::Token("x".into()).status(), 500);
    }

    #[test]
    fn model_validation_becomes_bad_request() {
        let e: ServiceError = models::errors::ModelError::Validation("invalid email".into()).into();
        assert_eq!(e.status(), 400);
        assert_eq!(e.to_string(), "invalid email");
    }
}
