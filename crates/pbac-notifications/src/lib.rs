pub mod error;
pub mod sink;
pub mod templates;
pub mod types;

pub use error::NotificationError;
pub use sink::{MemoryOutbox, NotificationSink, TracingSink};
pub use templates::{
    DEFAULT_RETROACTIVE_BODY, RETROACTIVE_TEMPLATE_ID, Template, TemplateRenderer,
};
pub use types::*;
