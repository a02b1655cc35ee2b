//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_assignhub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum AssignHubError {
            $($variant(String),)*
        }

        impl AssignHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(AssignHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(AssignHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(AssignHubError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl AssignHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        AssignHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_assignhub_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    NotFound("E005", "Resource Not Found"),
    Authentication("E006", "Authentication Error"),
    Authorization("E007", "Authorization Error"),
    InvalidState("E008", "Invalid State Error"),
}

impl AssignHubError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否属于调用方可见的业务错误（其余均为内部错误）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AssignHubError::Validation(_)
                | AssignHubError::NotFound(_)
                | AssignHubError::Authentication(_)
                | AssignHubError::Authorization(_)
                | AssignHubError::InvalidState(_)
        )
    }
}

impl fmt::Display for AssignHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AssignHubError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AssignHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        AssignHubError::DatabaseOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AssignHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AssignHubError::database_config("test").code(), "E001");
        assert_eq!(AssignHubError::validation("test").code(), "E004");
        assert_eq!(AssignHubError::authorization("test").code(), "E007");
        assert_eq!(AssignHubError::invalid_state("test").code(), "E008");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AssignHubError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            AssignHubError::invalid_state("test").error_type(),
            "Invalid State Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = AssignHubError::invalid_state("Cannot edit completed assignment");
        assert_eq!(err.message(), "Cannot edit completed assignment");
    }

    #[test]
    fn test_format_simple() {
        let err = AssignHubError::not_found("Assignment not found");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("Assignment not found"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AssignHubError::invalid_state("x").is_client_error());
        assert!(AssignHubError::authorization("x").is_client_error());
        assert!(!AssignHubError::database_operation("x").is_client_error());
    }
}
