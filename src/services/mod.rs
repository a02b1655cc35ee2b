pub mod assignments;
pub mod auth;

pub use assignments::AssignmentService;
pub use auth::AuthService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;
use tracing::error;

use crate::errors::AssignHubError;
use crate::models::ApiResponse;
use crate::storage::Storage;

/// 从 app_data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("Storage not configured")
        })
}

/// 业务错误对应的 HTTP 状态码
pub(crate) fn status_of(err: &AssignHubError) -> StatusCode {
    match err {
        AssignHubError::Validation(_) | AssignHubError::InvalidState(_) => StatusCode::BAD_REQUEST,
        AssignHubError::NotFound(_) => StatusCode::NOT_FOUND,
        AssignHubError::Authentication(_) => StatusCode::UNAUTHORIZED,
        AssignHubError::Authorization(_) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 将业务错误转换为统一格式的错误响应
pub(crate) fn error_response(err: &AssignHubError) -> HttpResponse {
    if !err.is_client_error() {
        error!("{}", err.format_simple());
    }
    HttpResponse::build(status_of(err)).json(ApiResponse::from_error(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(&AssignHubError::invalid_state("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&AssignHubError::validation("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&AssignHubError::not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(&AssignHubError::authorization("x")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(&AssignHubError::database_operation("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
