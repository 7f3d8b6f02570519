use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("No valid entries found in log")]
    NoValidEntries,

    #[error("Thread not found in log: {0}")]
    UnknownThread(String),
}

pub type Result<T> = std::result::Result<T, Error>;
