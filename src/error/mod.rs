mod app;
mod config;
mod publish;
mod session;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use publish::PublishError;
pub use session::SessionError;
pub use validation::{RunConfigField, ValidationError};
