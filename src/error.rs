use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// 用户输入不合法，只在对话框内提示
    #[error("{0}")]
    Validation(String),

    #[error("sheet {sheet_id} does not exist")]
    ForeignKey { sheet_id: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("unsupported schema version {found}")]
    UnsupportedSchema { found: i64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, Self::ForeignKey { .. })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_bare() {
        let err = AppError::validation("Title required");
        assert_eq!(err.to_string(), "Title required");
        assert!(err.is_validation());
        assert!(!err.is_foreign_key());
    }

    #[test]
    fn test_foreign_key_display() {
        let err = AppError::ForeignKey { sheet_id: 7 };
        assert_eq!(err.to_string(), "sheet 7 does not exist");
        assert!(err.is_foreign_key());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io_err.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
