//! 作业生命周期管理
//!
//! - `guard`: 调用方身份与角色/所有权校验
//! - `rules`: 状态迁移表与提交前置条件（纯函数，不访问存储）
//! - `manager`: 加载 -> 校验 -> 变更 -> 持久化 的完整操作

pub mod guard;
pub mod manager;
pub mod rules;

pub use guard::{Caller, require_owner, require_role};
pub use manager::AssignmentLifecycle;
pub use rules::{Verdict, Violation, check_delete, check_submission, check_update, update_verdict};
