use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    assignments::{
        entities::{Assignment, Submission},
        requests::{AssignmentChanges, AssignmentListQuery, CreateAssignmentRequest},
    },
    users::{
        entities::{User, UserBrief},
        requests::CreateUserRequest,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 批量获取用户简要信息
    async fn get_user_briefs(&self, ids: &[i64]) -> Result<HashMap<i64, UserBrief>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 作业管理方法
    // 创建作业（初始状态为草稿）
    async fn create_assignment(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    // 通过ID获取作业（含提交列表）
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    // 列出作业，按创建时间倒序
    async fn list_assignments(&self, query: AssignmentListQuery) -> Result<Vec<Assignment>>;
    // 更新作业字段，同时刷新 updated_at
    async fn update_assignment(
        &self,
        assignment_id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>>;
    // 删除作业（级联删除提交）
    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool>;

    /// 提交管理方法
    // 插入提交；同一学生已提交过时返回 None
    async fn insert_submission_if_absent(
        &self,
        assignment_id: i64,
        student_id: i64,
        answer: String,
    ) -> Result<Option<Submission>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
