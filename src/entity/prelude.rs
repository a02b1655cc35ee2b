//! 预导入模块，方便使用

pub use super::assignment_submissions::{
    ActiveModel as SubmissionActiveModel, Entity as AssignmentSubmissions,
    Model as SubmissionModel,
};
pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
