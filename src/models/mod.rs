pub mod assignments;
pub mod auth;
pub mod common;
pub mod users;

pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};

/// 业务错误码，随 ApiResponse 一起返回给前端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    NotFound = 1004,
    InternalServerError = 1500,

    // 认证授权
    Unauthorized = 2000,
    AuthFailed = 2001,
    Forbidden = 2003,

    // 用户
    UserNotFound = 3000,
    UserNameInvalid = 3001,
    UserEmailInvalid = 3002,
    UserPasswordInvalid = 3003,
    UserNameAlreadyExists = 3004,
    UserEmailAlreadyExists = 3005,
    RegisterFailed = 3006,

    // 作业
    AssignmentNotFound = 4000,
    AssignmentStateInvalid = 4001,
    SubmissionNotFound = 4002,
}

/// 程序启动时间，用于健康检查计算运行时长
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
