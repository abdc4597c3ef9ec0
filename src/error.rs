use thiserror::Error;

#[derive(Debug, Error)]
pub enum TarmacError {
    #[error("connection: {message}")]
    Connection { message: String },

    #[error("statement: {message}")]
    Statement { message: String },

    #[error("input: {message}")]
    Input { message: String },

    #[error("transfer: {message}")]
    Transfer { message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for TarmacError {
    fn from(err: sqlx::Error) -> Self {
        TarmacError::Statement {
            message: err.to_string(),
        }
    }
}
