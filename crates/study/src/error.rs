use study_core::StudyError;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Study(#[from] StudyError),

    #[error("Storage error: {0}")]
    Storage(std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AppError::NotFound(format!("Study '{id}' does not exist")),
            StoreError::InvalidId(id) => AppError::BadRequest(format!("Invalid study id '{id}'")),
            StoreError::Study(e) => AppError::Study(e),
            StoreError::Io(e) => AppError::Storage(e),
        }
    }
}

impl AppError {
    /// Message for the person at the board. Internal failures are logged
    /// and reported generically.
    pub fn notice(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::NotFound(msg) => {
                format!("{msg}. Create it with `study new` or check the id in the embed block.")
            }
            AppError::Study(e) if e.is_parse_error() => format!("Could not read the study: {e}"),
            AppError::Study(e) if e.is_structural() => format!("Move rejected: {e}"),
            AppError::Study(StudyError::IllegalMove { from, to }) => format!("Illegal move {from}-{to}"),
            AppError::Study(StudyError::Config(msg)) => format!("Invalid settings: {msg}"),
            AppError::Study(e) => {
                tracing::error!("Study error: {e}");
                format!("Study file is damaged: {e}")
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                "Could not access the study storage".to_string()
            }
            AppError::Anyhow(e) => {
                tracing::error!("Unexpected error: {e}");
                "Internal error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_notices() {
        let e: AppError = StoreError::NotFound("abc".into()).into();
        assert!(matches!(e, AppError::NotFound(_)));
        assert!(e.notice().contains("study new"));

        let e: AppError = StoreError::InvalidId("../x".into()).into();
        assert_eq!(e.notice(), "Invalid study id '../x'");
    }

    #[test]
    fn test_study_errors_map_to_notices() {
        let e = AppError::from(StudyError::Parse("Illegal move 'Ke3'".into()));
        assert!(e.notice().starts_with("Could not read the study"));

        let e = AppError::from(StudyError::NotTerminal("abc".into()));
        assert!(e.notice().starts_with("Move rejected"));
    }
}
