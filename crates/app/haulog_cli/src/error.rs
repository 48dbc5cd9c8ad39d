use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Auth(#[from] haulog_core::AuthError),

    #[error("{}", .0)]
    Api(#[from] haulog_client::ApiError),

    #[error("Json::{:?}: {}", .0, .0)]
    Json(#[from] serde_json::Error),
}
