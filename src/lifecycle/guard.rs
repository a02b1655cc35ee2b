use tracing::debug;

use crate::errors::{AssignHubError, Result};
use crate::models::assignments::entities::Assignment;
use crate::models::users::entities::{User, UserRole};

/// 已认证的调用方（身份 + 角色）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: UserRole,
}

impl Caller {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn teacher(id: i64) -> Self {
        Self::new(id, UserRole::Teacher)
    }

    pub fn student(id: i64) -> Self {
        Self::new(id, UserRole::Student)
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// 要求调用方具有指定角色
pub fn require_role(caller: &Caller, role: UserRole) -> Result<()> {
    if caller.role == role {
        Ok(())
    } else {
        debug!(
            "Role check failed for user {}: has {}, requires {}",
            caller.id, caller.role, role
        );
        Err(AssignHubError::authorization("Access denied"))
    }
}

/// 要求调用方是作业的创建者
pub fn require_owner(caller: &Caller, assignment: &Assignment) -> Result<()> {
    if assignment.teacher_id == caller.id {
        Ok(())
    } else {
        debug!(
            "Ownership check failed: user {} is not the owner of assignment {}",
            caller.id, assignment.id
        );
        Err(AssignHubError::authorization("Access denied"))
    }
}
