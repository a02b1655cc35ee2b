pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod submission;
pub mod submit;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::Result;
use crate::lifecycle::Caller;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::{Assignment, Submission},
        requests::{
            CreateAssignmentRequest, SubmitAnswerRequest, TeacherAssignmentParams,
            UpdateAssignmentRequest,
        },
        responses::{AssignmentDetail, SubmissionDetail},
    },
};
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 创建作业
    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        body: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create_assignment(self, request, body).await
    }

    // 教师作业列表
    pub async fn list_teacher_assignments(
        &self,
        request: &HttpRequest,
        params: TeacherAssignmentParams,
    ) -> ActixResult<HttpResponse> {
        list::handle_list_teacher_assignments(self, request, params).await
    }

    // 学生作业列表
    pub async fn list_student_assignments(
        &self,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::handle_list_student_assignments(self, request).await
    }

    // 作业详情
    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::handle_get_assignment(self, request, assignment_id).await
    }

    // 更新作业
    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        body: UpdateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        update::handle_update_assignment(self, request, assignment_id, body).await
    }

    // 删除作业
    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::handle_delete_assignment(self, request, assignment_id).await
    }

    // 提交答案
    pub async fn submit_answer(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        body: SubmitAnswerRequest,
    ) -> ActixResult<HttpResponse> {
        submit::handle_submit_answer(self, request, assignment_id, body).await
    }

    // 查看自己的提交
    pub async fn get_own_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        submission::handle_get_own_submission(self, request, assignment_id).await
    }
}

/// 取出 RequireJWT 写入的调用方，缺失时返回 401 响应
pub(crate) fn caller_or_unauthorized(request: &HttpRequest) -> std::result::Result<Caller, HttpResponse> {
    RequireJWT::extract_caller(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

// 作业引用到的全部用户（教师 + 提交学生），去重
fn referenced_user_ids(assignments: &[Assignment]) -> Vec<i64> {
    assignments
        .iter()
        .flat_map(|a| {
            std::iter::once(a.teacher_id).chain(a.submissions.iter().map(|s| s.student_id))
        })
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}

/// 批量展开教师与提交学生的用户信息
pub(crate) async fn populate_assignments(
    storage: &Arc<dyn Storage>,
    assignments: Vec<Assignment>,
) -> Result<Vec<AssignmentDetail>> {
    let users = storage
        .get_user_briefs(&referenced_user_ids(&assignments))
        .await?;

    Ok(assignments
        .into_iter()
        .map(|a| AssignmentDetail::from_assignment(a, &users))
        .collect())
}

pub(crate) async fn populate_assignment(
    storage: &Arc<dyn Storage>,
    assignment: Assignment,
) -> Result<AssignmentDetail> {
    let users = storage
        .get_user_briefs(&referenced_user_ids(std::slice::from_ref(&assignment)))
        .await?;
    Ok(AssignmentDetail::from_assignment(assignment, &users))
}

pub(crate) async fn populate_submission(
    storage: &Arc<dyn Storage>,
    submission: Submission,
) -> Result<SubmissionDetail> {
    let users = storage.get_user_briefs(&[submission.student_id]).await?;
    Ok(SubmissionDetail::from_submission(submission, &users))
}
