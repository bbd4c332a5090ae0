use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("GPIO error: {0}")]
    Gpio(String),
    #[error("Output channel error: {0}")]
    Channel(String),
    #[error("Output channel closed by consumer")]
    ChannelClosed,
    #[error("Signal setup error: {0}")]
    Signal(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Gpio(_)
            | AppError::Channel(_)
            | AppError::ChannelClosed
            | AppError::Signal(_) => 1,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}
