//! Error types for every layer of the application.

use thiserror::Error;

/// Rejections raised by the cycle assignment view.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("hatim {0} does not exist")]
    InvalidHatim(u8),

    #[error("hatim {requested} is locked until the previous hatims are complete")]
    PreviousHatimIncomplete { requested: u8 },

    #[error("no cüz with id {0}")]
    UnknownRecord(String),

    #[error("cüz {0} already has a name and is not being edited")]
    NotEditable(String),

    #[error("admin session required")]
    NotAdmin,

    #[error("wrong admin password")]
    WrongPassword,
}

/// Failures talking to the remote `cuzlers` resource.
#[cfg(feature = "web")]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XLSX export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Startup failures of the web application.
#[cfg(feature = "web")]
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("admin password hashing failed: {0}")]
    PasswordHash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
