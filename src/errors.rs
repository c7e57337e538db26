use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::OrderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match &e {
            OrderError::OrderNotFound(_) | OrderError::DetailNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(message) => HttpResponse::NotFound().json(serde_json::json!({
                "error": message
            })),
            AppError::BadRequest(message) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": message
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;

    use super::*;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("order not found with id: 1".to_string()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("unknown order status: shipped".to_string())
            .error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_order_maps_to_not_found() {
        let app_err: AppError = OrderError::OrderNotFound(7).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn missing_detail_maps_to_not_found() {
        let app_err: AppError = OrderError::DetailNotFound(7).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn database_failure_maps_to_internal() {
        let app_err: AppError = OrderError::database("fetching order 7", "oops").into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn failed_deletion_maps_to_internal() {
        let app_err: AppError =
            OrderError::OrderDeletion(7, "order not found with id: 7".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
