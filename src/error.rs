use crate::clients::fault::ApiFault;
use std::fmt;

/// 应用程序错误类型
///
/// 校验错误不走这里：它们被收集成列表（ValidationError），从不抛出。
/// 这里只承载会让一个组提前终止的错误；
/// 编排层在组边界统一捕获并转成行级状态，批次永远不会被中断。
#[derive(Debug)]
pub enum AppError {
    /// 必需实体缺失且未开启自动创建（行级状态为 needs_review）
    EntityNotFound { kind: EntityKind, name: String },
    /// 外部 API 故障（重试耗尽后传播到这里）
    Api(ApiFault),
    /// 其他错误（单据构造失败等）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EntityNotFound { kind, name } => {
                write!(f, "{} \"{}\" not found and auto-create is disabled", kind, name)
            }
            AppError::Api(fault) => write!(f, "{}", fault.message_text()),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<ApiFault> for AppError {
    fn from(fault: ApiFault) -> Self {
        AppError::Api(fault)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建实体缺失错误
    pub fn entity_not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        AppError::EntityNotFound {
            kind,
            name: name.into(),
        }
    }
}

/// 外部实体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    SubCustomer,
    Vendor,
    Department,
    Class,
    ExpenseAccount,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Customer => "Customer",
            EntityKind::SubCustomer => "Project",
            EntityKind::Vendor => "Vendor",
            EntityKind::Department => "Department",
            EntityKind::Class => "Class",
            EntityKind::ExpenseAccount => "Expense account",
        };
        write!(f, "{}", name)
    }
}

/// 字段级校验错误
///
/// 收集而非快速失败；消息是面向使用者的英文文本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub row_index: usize,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(row_index: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row_index,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}: {}", self.row_index + 1, self.field, self.message)
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
