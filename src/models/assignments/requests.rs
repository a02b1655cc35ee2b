use crate::models::assignments::entities::AssignmentStatus;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

/// 创建作业请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: String,
    #[serde(alias = "dueDate")]
    pub due_date: DateTime<Utc>, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
}

/// 更新作业请求（缺省或空字符串的字段保持原值）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
}

/// 教师作业列表查询参数（HTTP 请求）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct TeacherAssignmentParams {
    pub status: Option<AssignmentStatus>,
}

/// 提交答案请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone, Default)]
pub struct AssignmentListQuery {
    pub teacher_id: Option<i64>,
    pub status: Option<AssignmentStatus>,
}

// 用于存储层的字段变更（None 表示保持原值）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
}

impl AssignmentChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }
}
