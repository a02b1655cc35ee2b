use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::AssignHubError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 根据业务错误构造响应体，内部错误只暴露错误信息字符串
    pub fn from_error(err: &AssignHubError) -> Self {
        let code = match err {
            AssignHubError::Validation(_) => ErrorCode::ValidationFailed,
            AssignHubError::NotFound(_) => ErrorCode::NotFound,
            AssignHubError::Authentication(_) => ErrorCode::Unauthorized,
            AssignHubError::Authorization(_) => ErrorCode::Forbidden,
            AssignHubError::InvalidState(_) => ErrorCode::AssignmentStateInvalid,
            _ => ErrorCode::InternalServerError,
        };
        Self::error_empty(code, err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_carries_data() {
        let resp = ApiResponse::success(42_i32, "ok");
        assert_eq!(resp.code, ErrorCode::Success as i32);
        assert_eq!(resp.data, Some(42));
        assert_eq!(resp.message, "ok");
    }

    #[test]
    fn test_from_error_maps_codes() {
        let resp = ApiResponse::from_error(&AssignHubError::invalid_state("frozen"));
        assert_eq!(resp.code, ErrorCode::AssignmentStateInvalid as i32);
        assert_eq!(resp.message, "frozen");
        assert!(resp.data.is_none());

        let resp = ApiResponse::from_error(&AssignHubError::database_operation("disk full"));
        assert_eq!(resp.code, ErrorCode::InternalServerError as i32);
    }

    #[test]
    fn test_empty_data_is_not_serialized() {
        let json = serde_json::to_value(ApiResponse::success_empty("done")).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["code"], 0);
    }
}
