use thiserror::Error;

#[derive(Error, Debug)]
pub enum EquigenError {
    #[error("Invalid equation: {0}")]
    InvalidEquation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Expression error: {0}")]
    Expression(#[from] meval::Error),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EquigenError>;
