use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Sink closed: {0}")]
    SinkClosed(String),
}
