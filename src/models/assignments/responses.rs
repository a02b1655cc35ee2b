use crate::models::assignments::entities::{Assignment, AssignmentStatus, Submission};
use crate::models::users::entities::UserBrief;
use serde::Serialize;
use std::collections::HashMap;
use ts_rs::TS;

/// 提交详情（学生信息已展开）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct SubmissionDetail {
    pub id: i64,
    pub student_id: i64,
    pub student: Option<UserBrief>,
    pub answer: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub reviewed: bool,
}

/// 作业详情（教师与提交学生信息已展开）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub status: AssignmentStatus,
    pub teacher_id: i64,
    pub teacher: Option<UserBrief>,
    pub submissions: Vec<SubmissionDetail>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<AssignmentDetail>,
}

impl SubmissionDetail {
    pub fn from_submission(submission: Submission, users: &HashMap<i64, UserBrief>) -> Self {
        Self {
            student: users.get(&submission.student_id).cloned(),
            id: submission.id,
            student_id: submission.student_id,
            answer: submission.answer,
            submitted_at: submission.submitted_at,
            reviewed: submission.reviewed,
        }
    }
}

impl AssignmentDetail {
    pub fn from_assignment(assignment: Assignment, users: &HashMap<i64, UserBrief>) -> Self {
        Self {
            teacher: users.get(&assignment.teacher_id).cloned(),
            submissions: assignment
                .submissions
                .into_iter()
                .map(|s| SubmissionDetail::from_submission(s, users))
                .collect(),
            id: assignment.id,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            status: assignment.status,
            teacher_id: assignment.teacher_id,
            created_at: assignment.created_at,
            updated_at: assignment.updated_at,
        }
    }
}
