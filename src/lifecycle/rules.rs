//! 作业状态机规则
//!
//! 更新合法性由 (当前状态 × 请求状态) 迁移表决定，请求状态可缺省（只改内容）。
//!
//! | 当前 \ 请求 | 缺省 | draft | published | completed |
//! |-------------|------|-------|-----------|-----------|
//! | draft       | 允许 | 允许  | 允许      | 拒绝      |
//! | published   | 拒绝 | 拒绝  | 拒绝      | 允许      |
//! | completed   | 拒绝 | 拒绝  | 拒绝      | 拒绝      |

use chrono::{DateTime, Utc};

use crate::errors::AssignHubError;
use crate::models::assignments::entities::{Assignment, AssignmentStatus};

/// 违反生命周期约束的具体原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// 已发布的作业只能被标记为完成
    PublishedFrozen,
    /// 已完成的作业不可再修改
    CompletedFrozen,
    /// 草稿不能跳过发布直接完成
    CompletedBeforePublish,
    /// 只有草稿可以删除
    DeleteNonDraft,
    /// 作业未发布，不接受提交
    NotOpenForSubmission,
    DeadlinePassed,
    AlreadySubmitted,
}

impl Violation {
    pub fn message(&self) -> &'static str {
        match self {
            Violation::PublishedFrozen => "Cannot edit published assignment",
            Violation::CompletedFrozen => "Cannot edit completed assignment",
            Violation::CompletedBeforePublish => {
                "Assignment must be published before it can be completed"
            }
            Violation::DeleteNonDraft => "Can only delete draft assignments",
            Violation::NotOpenForSubmission => "Assignment is not available for submission",
            Violation::DeadlinePassed => "Assignment submission deadline has passed",
            Violation::AlreadySubmitted => "You have already submitted this assignment",
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<Violation> for AssignHubError {
    fn from(violation: Violation) -> Self {
        AssignHubError::invalid_state(violation.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(Violation),
}

/// 迁移表
pub fn update_verdict(current: AssignmentStatus, requested: Option<AssignmentStatus>) -> Verdict {
    use AssignmentStatus::{Completed, Draft, Published};

    match (current, requested) {
        (Draft, None | Some(Draft) | Some(Published)) => Verdict::Allow,
        (Draft, Some(Completed)) => Verdict::Deny(Violation::CompletedBeforePublish),

        (Published, Some(Completed)) => Verdict::Allow,
        (Published, None | Some(Draft) | Some(Published)) => {
            Verdict::Deny(Violation::PublishedFrozen)
        }

        (Completed, _) => Verdict::Deny(Violation::CompletedFrozen),
    }
}

pub fn check_update(
    current: AssignmentStatus,
    requested: Option<AssignmentStatus>,
) -> Result<(), Violation> {
    match update_verdict(current, requested) {
        Verdict::Allow => Ok(()),
        Verdict::Deny(violation) => Err(violation),
    }
}

pub fn check_delete(current: AssignmentStatus) -> Result<(), Violation> {
    match current {
        AssignmentStatus::Draft => Ok(()),
        AssignmentStatus::Published | AssignmentStatus::Completed => {
            Err(Violation::DeleteNonDraft)
        }
    }
}

/// 提交前置条件，按固定顺序检查：状态 -> 截止时间 -> 重复提交
pub fn check_submission(
    assignment: &Assignment,
    student_id: i64,
    now: DateTime<Utc>,
) -> Result<(), Violation> {
    if assignment.status != AssignmentStatus::Published {
        return Err(Violation::NotOpenForSubmission);
    }

    if now > assignment.due_date {
        return Err(Violation::DeadlinePassed);
    }

    if assignment.submission_of(student_id).is_some() {
        return Err(Violation::AlreadySubmitted);
    }

    Ok(())
}
