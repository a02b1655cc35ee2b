use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::guard::{Caller, require_owner, require_role};
use super::rules::{Violation, check_delete, check_submission, check_update};
use crate::errors::{AssignHubError, Result};
use crate::models::assignments::{
    entities::{Assignment, AssignmentStatus, Submission},
    requests::{
        AssignmentChanges, AssignmentListQuery, CreateAssignmentRequest, SubmitAnswerRequest,
        UpdateAssignmentRequest,
    },
};
use crate::models::users::entities::UserRole;
use crate::storage::Storage;

/// 作业生命周期操作入口
///
/// 所有操作都以已认证的 [`Caller`] 为参数，按 角色 -> 存在性 -> 所有权 -> 状态 的顺序校验，
/// 任一环节失败都不会产生写入。
#[derive(Clone)]
pub struct AssignmentLifecycle {
    storage: Arc<dyn Storage>,
}

impl AssignmentLifecycle {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 教师创建作业，初始为草稿
    pub async fn create(&self, caller: &Caller, req: CreateAssignmentRequest) -> Result<Assignment> {
        require_role(caller, UserRole::Teacher)?;

        let req = CreateAssignmentRequest {
            title: required_text(&req.title, "Title")?,
            description: required_text(&req.description, "Description")?,
            due_date: whole_second(req.due_date)?,
        };

        let assignment = self.storage.create_assignment(caller.id, req).await?;
        info!(
            "Assignment {} created by teacher {}",
            assignment.id, caller.id
        );
        Ok(assignment)
    }

    /// 教师查看自己的作业，可按状态筛选
    pub async fn list_for_teacher(
        &self,
        caller: &Caller,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>> {
        require_role(caller, UserRole::Teacher)?;

        self.storage
            .list_assignments(AssignmentListQuery {
                teacher_id: Some(caller.id),
                status,
            })
            .await
    }

    /// 学生查看全部已发布作业
    pub async fn list_published_for_student(&self, caller: &Caller) -> Result<Vec<Assignment>> {
        require_role(caller, UserRole::Student)?;

        self.storage
            .list_assignments(AssignmentListQuery {
                teacher_id: None,
                status: Some(AssignmentStatus::Published),
            })
            .await
    }

    /// 任意已认证用户按 ID 查看作业
    pub async fn get_by_id(&self, _caller: &Caller, assignment_id: i64) -> Result<Assignment> {
        self.load(assignment_id).await
    }

    /// 教师更新自己的作业
    ///
    /// 空白的文本字段视为未提供；没有任何有效变更时原样返回。
    pub async fn update(
        &self,
        caller: &Caller,
        assignment_id: i64,
        req: UpdateAssignmentRequest,
    ) -> Result<Assignment> {
        require_role(caller, UserRole::Teacher)?;
        let assignment = self.load(assignment_id).await?;
        require_owner(caller, &assignment)?;
        check_update(assignment.status, req.status).inspect_err(|v| {
            debug!(
                "Update of assignment {} rejected in status {}: {}",
                assignment_id, assignment.status, v
            )
        })?;

        let changes = AssignmentChanges {
            title: optional_text(req.title),
            description: optional_text(req.description),
            due_date: req.due_date.map(whole_second).transpose()?,
            status: req.status,
        };
        if changes.is_empty() {
            return Ok(assignment);
        }

        let updated = self
            .storage
            .update_assignment(assignment_id, changes)
            .await?
            .ok_or_else(not_found)?;

        if updated.status != assignment.status {
            info!(
                "Assignment {} moved from {} to {}",
                assignment_id, assignment.status, updated.status
            );
        }
        Ok(updated)
    }

    /// 教师删除自己的草稿
    pub async fn delete(&self, caller: &Caller, assignment_id: i64) -> Result<()> {
        require_role(caller, UserRole::Teacher)?;
        let assignment = self.load(assignment_id).await?;
        require_owner(caller, &assignment)?;
        check_delete(assignment.status)?;

        if !self.storage.delete_assignment(assignment_id).await? {
            return Err(not_found());
        }

        info!("Assignment {} deleted by teacher {}", assignment_id, caller.id);
        Ok(())
    }

    /// 学生提交答案，返回包含新提交的作业
    pub async fn submit(
        &self,
        caller: &Caller,
        assignment_id: i64,
        req: SubmitAnswerRequest,
    ) -> Result<Assignment> {
        require_role(caller, UserRole::Student)?;
        let assignment = self.load(assignment_id).await?;
        check_submission(&assignment, caller.id, Utc::now())?;
        let answer = required_text(&req.answer, "Answer")?;

        let Some(submission) = self
            .storage
            .insert_submission_if_absent(assignment_id, caller.id, answer)
            .await?
        else {
            // 并发提交中另一请求先写入
            return Err(Violation::AlreadySubmitted.into());
        };

        info!(
            "Student {} submitted assignment {} (submission {})",
            caller.id, assignment_id, submission.id
        );
        self.load(assignment_id).await
    }

    /// 学生查看自己的提交
    pub async fn get_own_submission(
        &self,
        caller: &Caller,
        assignment_id: i64,
    ) -> Result<Submission> {
        require_role(caller, UserRole::Student)?;
        let assignment = self.load(assignment_id).await?;

        assignment
            .submission_of(caller.id)
            .cloned()
            .ok_or_else(|| AssignHubError::not_found("No submission found"))
    }

    async fn load(&self, assignment_id: i64) -> Result<Assignment> {
        self.storage
            .get_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(not_found)
    }
}

fn not_found() -> AssignHubError {
    AssignHubError::not_found("Assignment not found")
}

fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AssignHubError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

// 截止时间按秒存储，不接受亚秒精度
fn whole_second(due_date: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if due_date.timestamp_subsec_nanos() != 0 {
        return Err(AssignHubError::validation(
            "Due date must be given in whole seconds",
        ));
    }
    Ok(due_date)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use chrono::{DateTime, Duration, SubsecRound};

    struct Fixture {
        lifecycle: AssignmentLifecycle,
        teacher_a: Caller,
        teacher_b: Caller,
        student_s: Caller,
        student_t: Caller,
    }

    async fn setup() -> Fixture {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());
        let mut callers = Vec::new();
        for (name, role) in [
            ("teacher_a", UserRole::Teacher),
            ("teacher_b", UserRole::Teacher),
            ("student_s", UserRole::Student),
            ("student_t", UserRole::Student),
        ] {
            let user = storage
                .create_user(CreateUserRequest {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    password: "hashed".to_string(),
                    role,
                    display_name: None,
                })
                .await
                .unwrap();
            callers.push(Caller::from(&user));
        }

        Fixture {
            lifecycle: AssignmentLifecycle::new(storage),
            teacher_a: callers[0],
            teacher_b: callers[1],
            student_s: callers[2],
            student_t: callers[3],
        }
    }

    fn create_req(title: &str, due_date: DateTime<Utc>) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            title: title.to_string(),
            description: "Chapter 3 exercises".to_string(),
            due_date,
        }
    }

    fn status_req(status: AssignmentStatus) -> UpdateAssignmentRequest {
        UpdateAssignmentRequest {
            status: Some(status),
            ..Default::default()
        }
    }

    fn answer(text: &str) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            answer: text.to_string(),
        }
    }

    fn now_secs() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }

    fn tomorrow() -> DateTime<Utc> {
        now_secs() + Duration::days(1)
    }

    async fn published(f: &Fixture, title: &str, due_date: DateTime<Utc>) -> Assignment {
        let created = f
            .lifecycle
            .create(&f.teacher_a, create_req(title, due_date))
            .await
            .unwrap();
        f.lifecycle
            .update(&f.teacher_a, created.id, status_req(AssignmentStatus::Published))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let f = setup().await;

        let a = f
            .lifecycle
            .create(&f.teacher_a, create_req("Essay", tomorrow()))
            .await
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Draft);
        assert_eq!(a.teacher_id, f.teacher_a.id);

        let a = f
            .lifecycle
            .update(&f.teacher_a, a.id, status_req(AssignmentStatus::Published))
            .await
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Published);

        let listed = f.lifecycle.list_published_for_student(&f.student_s).await.unwrap();
        assert!(listed.iter().any(|x| x.id == a.id));

        let after_submit = f.lifecycle.submit(&f.student_s, a.id, answer("A1")).await.unwrap();
        assert_eq!(after_submit.submissions.len(), 1);
        assert_eq!(after_submit.submissions[0].student_id, f.student_s.id);
        assert_eq!(after_submit.submissions[0].answer, "A1");

        let err = f.lifecycle.submit(&f.student_s, a.id, answer("A2")).await.unwrap_err();
        assert_eq!(err, AssignHubError::from(Violation::AlreadySubmitted));

        let a = f
            .lifecycle
            .update(&f.teacher_a, a.id, status_req(AssignmentStatus::Completed))
            .await
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Completed);

        let err = f.lifecycle.submit(&f.student_t, a.id, answer("B1")).await.unwrap_err();
        assert_eq!(err, AssignHubError::from(Violation::NotOpenForSubmission));

        let own = f.lifecycle.get_own_submission(&f.student_s, a.id).await.unwrap();
        assert_eq!(own.answer, "A1");
        assert_eq!(own.submitted_at, after_submit.submissions[0].submitted_at);
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let f = setup().await;
        let a = f
            .lifecycle
            .create(&f.teacher_a, create_req("Draft", tomorrow()))
            .await
            .unwrap();

        let err = f
            .lifecycle
            .update(&f.teacher_b, a.id, status_req(AssignmentStatus::Published))
            .await
            .unwrap_err();
        assert_eq!(err, AssignHubError::authorization("Access denied"));

        let edit = UpdateAssignmentRequest {
            title: Some("X".into()),
            ..Default::default()
        };
        let err = f.lifecycle.update(&f.teacher_b, a.id, edit).await.unwrap_err();
        assert!(matches!(err, AssignHubError::Authorization(_)));

        let err = f.lifecycle.delete(&f.teacher_b, a.id).await.unwrap_err();
        assert!(matches!(err, AssignHubError::Authorization(_)));

        let unchanged = f.lifecycle.get_by_id(&f.teacher_b, a.id).await.unwrap();
        assert_eq!(unchanged.title, "Draft");
        assert_eq!(unchanged.status, AssignmentStatus::Draft);
    }

    #[tokio::test]
    async fn test_due_date_must_be_whole_seconds() {
        let f = setup().await;
        let fractional = tomorrow() + Duration::milliseconds(900);

        let err = f
            .lifecycle
            .create(&f.teacher_a, create_req("Precise", fractional))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignHubError::Validation(_)));

        let a = f
            .lifecycle
            .create(&f.teacher_a, create_req("Precise", tomorrow()))
            .await
            .unwrap();
        let edit = UpdateAssignmentRequest {
            due_date: Some(fractional),
            ..Default::default()
        };
        let err = f.lifecycle.update(&f.teacher_a, a.id, edit).await.unwrap_err();
        assert!(matches!(err, AssignHubError::Validation(_)));

        let stored = f.lifecycle.get_by_id(&f.teacher_a, a.id).await.unwrap();
        assert_eq!(stored.due_date, a.due_date);
    }

    #[tokio::test]
    async fn test_roles_are_enforced() {
        let f = setup().await;
        let err = f
            .lifecycle
            .create(&f.student_s, create_req("Nope", tomorrow()))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignHubError::Authorization(_)));

        let err = f.lifecycle.list_for_teacher(&f.student_s, None).await.unwrap_err();
        assert!(matches!(err, AssignHubError::Authorization(_)));

        let err = f.lifecycle.list_published_for_student(&f.teacher_a).await.unwrap_err();
        assert!(matches!(err, AssignHubError::Authorization(_)));

        let a = published(&f, "Open", tomorrow()).await;
        let err = f.lifecycle.submit(&f.teacher_a, a.id, answer("x")).await.unwrap_err();
        assert!(matches!(err, AssignHubError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_published_content_is_frozen() {
        let f = setup().await;
        let a = published(&f, "Frozen", tomorrow()).await;

        let edit = UpdateAssignmentRequest {
            title: Some("New".into()),
            ..Default::default()
        };
        let err = f.lifecycle.update(&f.teacher_a, a.id, edit).await.unwrap_err();
        assert_eq!(err, AssignHubError::invalid_state("Cannot edit published assignment"));

        let err = f
            .lifecycle
            .update(&f.teacher_a, a.id, status_req(AssignmentStatus::Draft))
            .await
            .unwrap_err();
        assert_eq!(err, AssignHubError::from(Violation::PublishedFrozen));

        let err = f.lifecycle.delete(&f.teacher_a, a.id).await.unwrap_err();
        assert_eq!(err, AssignHubError::from(Violation::DeleteNonDraft));

        let stored = f.lifecycle.get_by_id(&f.teacher_a, a.id).await.unwrap();
        assert_eq!(stored.title, "Frozen");
        assert_eq!(stored.status, AssignmentStatus::Published);
    }

    #[tokio::test]
    async fn test_completed_rejects_every_update() {
        let f = setup().await;
        let a = published(&f, "Done", tomorrow()).await;
        f.lifecycle
            .update(&f.teacher_a, a.id, status_req(AssignmentStatus::Completed))
            .await
            .unwrap();

        for status in [
            AssignmentStatus::Draft,
            AssignmentStatus::Published,
            AssignmentStatus::Completed,
        ] {
            let err = f
                .lifecycle
                .update(&f.teacher_a, a.id, status_req(status))
                .await
                .unwrap_err();
            assert_eq!(err, AssignHubError::from(Violation::CompletedFrozen));
        }
    }

    #[tokio::test]
    async fn test_draft_edit_ignores_blank_fields() {
        let f = setup().await;
        let a = f
            .lifecycle
            .create(&f.teacher_a, create_req("Original", tomorrow()))
            .await
            .unwrap();

        let edit = UpdateAssignmentRequest {
            title: Some("  Renamed ".into()),
            description: Some("   ".into()),
            ..Default::default()
        };
        let updated = f.lifecycle.update(&f.teacher_a, a.id, edit).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "Chapter 3 exercises");
        assert_eq!(updated.status, AssignmentStatus::Draft);

        let noop = f
            .lifecycle
            .update(&f.teacher_a, a.id, UpdateAssignmentRequest::default())
            .await
            .unwrap();
        assert_eq!(noop, updated);
    }

    #[tokio::test]
    async fn test_draft_cannot_skip_to_completed() {
        let f = setup().await;
        let a = f
            .lifecycle
            .create(&f.teacher_a, create_req("Skip", tomorrow()))
            .await
            .unwrap();
        let err = f
            .lifecycle
            .update(&f.teacher_a, a.id, status_req(AssignmentStatus::Completed))
            .await
            .unwrap_err();
        assert_eq!(err, AssignHubError::from(Violation::CompletedBeforePublish));
    }

    #[tokio::test]
    async fn test_delete_draft_then_not_found() {
        let f = setup().await;
        let a = f
            .lifecycle
            .create(&f.teacher_a, create_req("Temp", tomorrow()))
            .await
            .unwrap();
        f.lifecycle.delete(&f.teacher_a, a.id).await.unwrap();

        let err = f.lifecycle.get_by_id(&f.teacher_a, a.id).await.unwrap_err();
        assert_eq!(err, AssignHubError::not_found("Assignment not found"));
    }

    #[tokio::test]
    async fn test_late_submission_is_rejected() {
        let f = setup().await;
        let a = published(&f, "Late", now_secs() - Duration::seconds(1)).await;

        let err = f.lifecycle.submit(&f.student_s, a.id, answer("late")).await.unwrap_err();
        assert_eq!(err, AssignHubError::from(Violation::DeadlinePassed));

        let stored = f.lifecycle.get_by_id(&f.student_s, a.id).await.unwrap();
        assert!(stored.submissions.is_empty());
    }

    #[tokio::test]
    async fn test_draft_is_not_open_for_submission() {
        let f = setup().await;
        let a = f
            .lifecycle
            .create(&f.teacher_a, create_req("Hidden", tomorrow()))
            .await
            .unwrap();
        let err = f.lifecycle.submit(&f.student_s, a.id, answer("x")).await.unwrap_err();
        assert_eq!(err, AssignHubError::from(Violation::NotOpenForSubmission));
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let f = setup().await;
        let err = f
            .lifecycle
            .create(&f.teacher_a, create_req("   ", tomorrow()))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignHubError::Validation(_)));

        let a = published(&f, "Needs answer", tomorrow()).await;
        let err = f.lifecycle.submit(&f.student_s, a.id, answer(" ")).await.unwrap_err();
        assert!(matches!(err, AssignHubError::Validation(_)));
    }

    #[tokio::test]
    async fn test_student_sees_only_published() {
        let f = setup().await;
        let draft = f
            .lifecycle
            .create(&f.teacher_a, create_req("Draft", tomorrow()))
            .await
            .unwrap();
        let open = published(&f, "Open", tomorrow()).await;

        let listed = f.lifecycle.list_published_for_student(&f.student_s).await.unwrap();
        assert!(listed.iter().all(|a| a.status == AssignmentStatus::Published));
        assert!(listed.iter().any(|a| a.id == open.id));
        assert!(!listed.iter().any(|a| a.id == draft.id));
    }

    #[tokio::test]
    async fn test_teacher_list_filters_by_owner_and_status() {
        let f = setup().await;
        let draft = f
            .lifecycle
            .create(&f.teacher_a, create_req("Mine", tomorrow()))
            .await
            .unwrap();
        let open = published(&f, "Mine too", tomorrow()).await;
        f.lifecycle
            .create(&f.teacher_b, create_req("Theirs", tomorrow()))
            .await
            .unwrap();

        let mine = f.lifecycle.list_for_teacher(&f.teacher_a, None).await.unwrap();
        let ids: Vec<i64> = mine.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![open.id, draft.id]);

        let drafts = f
            .lifecycle
            .list_for_teacher(&f.teacher_a, Some(AssignmentStatus::Draft))
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, draft.id);
    }

    #[tokio::test]
    async fn test_own_submission_missing() {
        let f = setup().await;
        let a = published(&f, "Quiet", tomorrow()).await;
        f.lifecycle.submit(&f.student_s, a.id, answer("mine")).await.unwrap();

        let err = f.lifecycle.get_own_submission(&f.student_t, a.id).await.unwrap_err();
        assert_eq!(err, AssignHubError::not_found("No submission found"));

        let err = f.lifecycle.get_own_submission(&f.student_t, 9999).await.unwrap_err();
        assert_eq!(err, AssignHubError::not_found("Assignment not found"));
    }

    #[tokio::test]
    async fn test_submission_bumps_updated_at() {
        let f = setup().await;
        let a = published(&f, "Clock", tomorrow()).await;
        let after = f.lifecycle.submit(&f.student_s, a.id, answer("t")).await.unwrap();
        assert!(after.updated_at >= a.updated_at);
        assert_eq!(after.updated_at, after.submissions[0].submitted_at);
    }
}
