//! HTTP error mapping

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Wrapper mapping service errors onto HTTP responses
#[derive(Debug)]
pub struct ApiError(payment_service::Error);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ApiError {}

impl From<payment_service::Error> for ApiError {
    fn from(err: payment_service::Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn label(&self) -> &'static str {
        use payment_service::Error::*;
        match self.0 {
            Validation(_) => "ValidationError",
            FraudBlocked(_) => "FraudBlockedError",
            Refund(_) => "RefundError",
            NotFound(_) => "NotFoundError",
            Transient(_) => "TransientError",
            Conflict(_) => "ConflictError",
            Config(_) => "ConfigError",
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "error": self.label(),
            "message": self.to_string(),
        });
        use payment_service::Error::*;
        match self.0 {
            Validation(_) => HttpResponse::BadRequest().json(body),
            FraudBlocked(_) => HttpResponse::Forbidden().json(body),
            Refund(_) => HttpResponse::UnprocessableEntity().json(body),
            NotFound(_) => HttpResponse::NotFound().json(body),
            Transient(_) => HttpResponse::BadGateway().json(body),
            Conflict(_) => HttpResponse::Conflict().json(body),
            Config(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                payment_service::Error::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                payment_service::Error::FraudBlocked("blocked".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                payment_service::Error::Refund("nope".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                payment_service::Error::NotFound(Uuid::new_v4()),
                StatusCode::NOT_FOUND,
            ),
            (
                payment_service::Error::Transient("down".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                payment_service::Error::Conflict("race".to_string()),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).error_response().status(), expected);
        }
    }
}
