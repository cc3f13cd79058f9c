//! HTML email templates rendered with tera.

use serde_json::Value;
use tera::{Context, Tera};
use tracing::{info, warn};

use crate::domain::email_job::MailerError;

/// Loads `<dir>/**/*.html` once and renders by template name.
///
/// A name `welcome` resolves to the file `welcome.html`.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Loads templates from `dir`.
    ///
    /// A missing or broken template directory is logged and yields an empty
    /// renderer; template jobs then fail at delivery time.
    pub fn load(dir: &str) -> Self {
        let pattern = format!("{}/**/*.html", dir.trim_end_matches('/'));
        let tera = match Tera::new(&pattern) {
            Ok(tera) => {
                info!(
                    "Loaded {} email template(s) from {}",
                    tera.get_template_names().count(),
                    dir
                );
                tera
            }
            Err(e) => {
                warn!("Failed to load email templates from {}: {}", dir, e);
                Tera::default()
            }
        };
        Self { tera }
    }

    /// Builds a renderer from in-memory `(name, source)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Template`] if a source does not parse.
    pub fn from_templates<'a, I>(templates: I) -> Result<Self, MailerError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Tera::default();
        let templates: Vec<(String, &str)> = templates
            .into_iter()
            .map(|(name, source)| (Self::file_name(name), source))
            .collect();
        tera.add_raw_templates(templates)
            .map_err(|e| MailerError::Template {
                name: "<inline>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { tera })
    }

    /// # Errors
    ///
    /// Returns [`MailerError::Template`] for an unknown template or a render failure.
    pub fn render(&self, name: &str, context: &Value) -> Result<String, MailerError> {
        let context = match context {
            Value::Object(_) => Context::from_value(context.clone()).map_err(|e| {
                MailerError::Template {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            })?,
            _ => Context::new(),
        };

        self.tera
            .render(&Self::file_name(name), &context)
            .map_err(|e| MailerError::Template {
                name: name.to_string(),
                reason: render_reason(&e),
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        let file = Self::file_name(name);
        self.tera.get_template_names().any(|t| t == file)
    }

    fn file_name(name: &str) -> String {
        if name.ends_with(".html") {
            name.to_string()
        } else {
            format!("{}.html", name)
        }
    }
}

/// Tera nests the useful detail in `source()`.
fn render_reason(error: &tera::Error) -> String {
    let mut reason = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        reason.push_str(": ");
        reason.push_str(&inner.to_string());
        source = inner.source();
    }
    reason
}
