use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid option: {raw}. Expected NAME or NAME=VALUE")]
    InvalidOption { raw: String },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error(transparent)]
    Render(#[from] html2pdf::Error),
}

impl AppError {
    /// Process exit status: the renderer's own code when it failed, 2 otherwise.
    pub fn exit_status(&self) -> u8 {
        match self {
            AppError::Render(err) => match err.exit_code() {
                Some(code) => code.clamp(1, 255) as u8,
                None => 2,
            },
            _ => 2,
        }
    }
}
