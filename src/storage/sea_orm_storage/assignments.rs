//! 作业与提交存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::assignment_submissions::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn,
};
use crate::entity::assignments::{ActiveModel, Column};
use crate::entity::prelude::{AssignmentSubmissions, Assignments};
use crate::errors::{AssignHubError, Result};
use crate::models::assignments::{
    entities::{Assignment, AssignmentStatus, Submission},
    requests::{AssignmentChanges, AssignmentListQuery, CreateAssignmentRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            teacher_id: Set(teacher_id),
            title: Set(req.title),
            description: Set(req.description),
            due_date: Set(req.due_date.timestamp()),
            status: Set(AssignmentStatus::Draft.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment(Vec::new()))
    }

    /// 通过 ID 获取作业（提交按写入顺序排列）
    pub async fn get_assignment_by_id_impl(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        let Some(model) = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("查询作业失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut grouped = load_submissions(&self.db, vec![assignment_id]).await?;
        let submissions = grouped.remove(&assignment_id).unwrap_or_default();

        Ok(Some(model.into_assignment(submissions)))
    }

    /// 列出作业，按创建时间倒序（同一时间按 ID 倒序）
    pub async fn list_assignments_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<Vec<Assignment>> {
        let mut select = Assignments::find();

        // 教师筛选
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let models = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("查询作业列表失败: {e}")))?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut grouped = load_submissions(&self.db, ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let submissions = grouped.remove(&m.id).unwrap_or_default();
                m.into_assignment(submissions)
            })
            .collect())
    }

    /// 更新作业
    pub async fn update_assignment_impl(
        &self,
        assignment_id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>> {
        // 先检查作业是否存在
        let existing = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("查询作业失败: {e}")))?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(assignment_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = changes.title {
            model.title = Set(title);
        }

        if let Some(description) = changes.description {
            model.description = Set(description);
        }

        if let Some(due_date) = changes.due_date {
            model.due_date = Set(due_date.timestamp());
        }

        if let Some(status) = changes.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("更新作业失败: {e}")))?;

        self.get_assignment_by_id_impl(assignment_id).await
    }

    /// 删除作业及其全部提交
    pub async fn delete_assignment_impl(&self, assignment_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AssignHubError::database_operation(format!("开启事务失败: {e}")))?;

        AssignmentSubmissions::delete_many()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("删除作业提交失败: {e}")))?;

        let result = Assignments::delete_by_id(assignment_id)
            .exec(&txn)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("删除作业失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AssignHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 插入提交并刷新作业的 updated_at
    ///
    /// (assignment_id, student_id) 上有唯一索引，并发重复提交只有一个能写入成功，
    /// 其余返回 `Ok(None)`。
    pub async fn insert_submission_if_absent_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        answer: String,
    ) -> Result<Option<Submission>> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AssignHubError::database_operation(format!("开启事务失败: {e}")))?;

        let model = SubmissionActiveModel {
            assignment_id: Set(assignment_id),
            student_id: Set(student_id),
            answer: Set(answer),
            submitted_at: Set(now),
            reviewed: Set(false),
            ..Default::default()
        };

        let inserted = match model.insert(&txn).await {
            Ok(inserted) => inserted,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                txn.rollback().await.map_err(|e| {
                    AssignHubError::database_operation(format!("回滚事务失败: {e}"))
                })?;
                return Ok(None);
            }
            Err(e) => {
                return Err(AssignHubError::database_operation(format!(
                    "创建提交失败: {e}"
                )));
            }
        };

        Assignments::update_many()
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| AssignHubError::database_operation(format!("更新作业时间失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AssignHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(inserted.into_submission()))
    }
}

/// 批量加载提交，按作业 ID 分组
async fn load_submissions<C: ConnectionTrait>(
    conn: &C,
    assignment_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<Submission>>> {
    let submissions = AssignmentSubmissions::find()
        .filter(SubmissionColumn::AssignmentId.is_in(assignment_ids))
        .order_by_asc(SubmissionColumn::Id)
        .all(conn)
        .await
        .map_err(|e| AssignHubError::database_operation(format!("查询作业提交失败: {e}")))?;

    let mut grouped: HashMap<i64, Vec<Submission>> = HashMap::new();
    for submission in submissions {
        grouped
            .entry(submission.assignment_id)
            .or_default()
            .push(submission.into_submission());
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use chrono::{Duration, Utc};

    async fn setup() -> (SeaOrmStorage, i64, i64, i64) {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let mut ids = Vec::new();
        for (name, role) in [
            ("teacher_a", UserRole::Teacher),
            ("student_s", UserRole::Student),
            ("student_t", UserRole::Student),
        ] {
            let user = storage
                .create_user_impl(CreateUserRequest {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    password: "hashed".to_string(),
                    role,
                    display_name: None,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (storage, ids[0], ids[1], ids[2])
    }

    fn request(title: &str) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            title: title.to_string(),
            description: "Solve the exercises".to_string(),
            due_date: Utc::now() + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn test_created_assignment_is_draft() {
        let (storage, teacher, _, _) = setup().await;
        let created = storage
            .create_assignment_impl(teacher, request("Algebra"))
            .await
            .unwrap();
        assert_eq!(created.status, AssignmentStatus::Draft);
        assert!(created.submissions.is_empty());

        let loaded = storage
            .get_assignment_by_id_impl(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let (storage, teacher, _, _) = setup().await;
        let first = storage
            .create_assignment_impl(teacher, request("First"))
            .await
            .unwrap();
        let second = storage
            .create_assignment_impl(teacher, request("Second"))
            .await
            .unwrap();
        storage
            .update_assignment_impl(
                first.id,
                AssignmentChanges {
                    status: Some(AssignmentStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = storage
            .list_assignments_impl(AssignmentListQuery {
                teacher_id: Some(teacher),
                status: None,
            })
            .await
            .unwrap();
        let ids: Vec<i64> = all.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let published = storage
            .list_assignments_impl(AssignmentListQuery {
                teacher_id: None,
                status: Some(AssignmentStatus::Published),
            })
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, first.id);
    }

    #[tokio::test]
    async fn test_update_missing_assignment_returns_none() {
        let (storage, _, _, _) = setup().await;
        let result = storage
            .update_assignment_impl(
                42,
                AssignmentChanges {
                    title: Some("x".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_not_inserted() {
        let (storage, teacher, student_s, student_t) = setup().await;
        let assignment = storage
            .create_assignment_impl(teacher, request("Essay"))
            .await
            .unwrap();

        let first = storage
            .insert_submission_if_absent_impl(assignment.id, student_s, "A1".into())
            .await
            .unwrap();
        assert!(first.is_some());

        let duplicate = storage
            .insert_submission_if_absent_impl(assignment.id, student_s, "A2".into())
            .await
            .unwrap();
        assert!(duplicate.is_none());

        storage
            .insert_submission_if_absent_impl(assignment.id, student_t, "B1".into())
            .await
            .unwrap();

        let loaded = storage
            .get_assignment_by_id_impl(assignment.id)
            .await
            .unwrap()
            .unwrap();
        let answers: Vec<&str> = loaded.submissions.iter().map(|s| s.answer.as_str()).collect();
        assert_eq!(answers, vec!["A1", "B1"]);
    }

    #[tokio::test]
    async fn test_delete_removes_submissions() {
        let (storage, teacher, student_s, _) = setup().await;
        let assignment = storage
            .create_assignment_impl(teacher, request("Quiz"))
            .await
            .unwrap();
        storage
            .insert_submission_if_absent_impl(assignment.id, student_s, "answer".into())
            .await
            .unwrap();

        assert!(storage.delete_assignment_impl(assignment.id).await.unwrap());
        assert!(
            storage
                .get_assignment_by_id_impl(assignment.id)
                .await
                .unwrap()
                .is_none()
        );
        let orphans = load_submissions(&storage.db, vec![assignment.id])
            .await
            .unwrap();
        assert!(orphans.is_empty());
        assert!(!storage.delete_assignment_impl(assignment.id).await.unwrap());
    }
}
