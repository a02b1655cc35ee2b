use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 作业状态：草稿 -> 已发布 -> 已完成
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "assignment.ts")]
pub enum AssignmentStatus {
    Draft,     // 仅教师可见，可自由编辑
    Published, // 学生可见并可提交，内容冻结
    Completed, // 终态，完全冻结
}

impl AssignmentStatus {
    pub const DRAFT: &'static str = "draft";
    pub const PUBLISHED: &'static str = "published";
    pub const COMPLETED: &'static str = "completed";
}

impl<'de> Deserialize<'de> for AssignmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AssignmentStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid assignment status: '{s}'. Supported: draft, published, completed"
            ))
        })
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Draft => write!(f, "{}", AssignmentStatus::DRAFT),
            AssignmentStatus::Published => write!(f, "{}", AssignmentStatus::PUBLISHED),
            AssignmentStatus::Completed => write!(f, "{}", AssignmentStatus::COMPLETED),
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AssignmentStatus::DRAFT => Ok(AssignmentStatus::Draft),
            AssignmentStatus::PUBLISHED => Ok(AssignmentStatus::Published),
            AssignmentStatus::COMPLETED => Ok(AssignmentStatus::Completed),
            _ => Err(format!("Invalid assignment status: {s}")),
        }
    }
}

/// 学生提交（每个学生对同一作业至多一份）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub answer: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    // 预留给后续批改功能
    pub reviewed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    // 唯一 ID
    pub id: i64,
    // 作业标题
    pub title: String,
    // 作业描述
    pub description: String,
    // 截止时间，超过后拒绝提交
    pub due_date: chrono::DateTime<chrono::Utc>,
    // 生命周期状态
    pub status: AssignmentStatus,
    // 创建者（教师）ID，创建后不可变
    pub teacher_id: i64,
    // 按提交顺序排列
    pub submissions: Vec<Submission>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    /// 查找某个学生的提交
    pub fn submission_of(&self, student_id: i64) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.student_id == student_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        for status in [
            AssignmentStatus::Draft,
            AssignmentStatus::Published,
            AssignmentStatus::Completed,
        ] {
            assert_eq!(status.to_string().parse::<AssignmentStatus>(), Ok(status));
        }
        assert!("archived".parse::<AssignmentStatus>().is_err());
    }

    #[test]
    fn test_status_json_is_snake_case() {
        let json = serde_json::to_string(&AssignmentStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
        assert!(serde_json::from_str::<AssignmentStatus>("\"Published\"").is_err());
    }
}
