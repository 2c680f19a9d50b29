use std::collections::HashMap;

use crate::error::NotificationError;

/// Template id used for retroactive purpose updates.
pub const RETROACTIVE_TEMPLATE_ID: &str = "retroactive-purpose";

/// Default payload for retroactive purpose updates.
pub const DEFAULT_RETROACTIVE_BODY: &str = "Retroactive MP update applied to your subscriptions.";

/// Payload renderer using {{variable}} placeholders
pub struct TemplateRenderer {
    templates: HashMap<String, Template>,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    pub body: String,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Renderer with the retroactive-purpose template registered under
    /// [`RETROACTIVE_TEMPLATE_ID`].
    pub fn with_retroactive(body: impl Into<String>) -> Self {
        let mut renderer = Self::new();
        renderer.register(Template {
            id: RETROACTIVE_TEMPLATE_ID.to_string(),
            body: body.into(),
        });
        renderer
    }

    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn render(
        &self,
        template_id: &str,
        data: &HashMap<String, serde_json::Value>,
    ) -> Result<String, NotificationError> {
        let template = self
            .templates
            .get(template_id)
            .ok_or(NotificationError::TemplateNotFound(template_id.to_string()))?;

        Ok(render_placeholders(&template.body, data))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::with_retroactive(DEFAULT_RETROACTIVE_BODY)
    }
}

fn render_placeholders(body: &str, data: &HashMap<String, serde_json::Value>) -> String {
    let mut result = body.to_string();

    for (key, value) in data {
        let placeholder = format!("{{{{{}}}}}", key);
        let replacement = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => String::new(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            _ => value.to_string(),
        };
        result = result.replace(&placeholder, &replacement);
    }

    result
}
