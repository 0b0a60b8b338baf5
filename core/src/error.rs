use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input rejected with {} validation error(s)", errors.len())]
    Validation { errors: Vec<String> },

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

pub type ScanResult<T> = Result<T, ScanError>;
