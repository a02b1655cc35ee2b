use super::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

// 用户创建请求（注册）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub display_name: Option<String>,
}
