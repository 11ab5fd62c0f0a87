//! Template engine based on MiniJinja

use herald_core::ReleaseContext;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use crate::error::{EngineError, Result, TemplateError};
use crate::filters;

/// Delimiters that mark a value as a template
const TEMPLATE_DELIMITERS: &[&str] = &["{{", "{%", "{#"];

/// Whether `raw` contains any template delimiter
pub fn has_template_syntax(raw: &str) -> bool {
    TEMPLATE_DELIMITERS.iter().any(|d| raw.contains(d))
}

/// The template engine.
///
/// Undefined context keys are always errors; a manifest is never rendered
/// with a silently empty value.
#[derive(Debug, Clone, Default)]
pub struct Engine;

impl Engine {
    /// Create a configured MiniJinja environment
    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        // Manifests are JSON/YAML/text; values are inserted verbatim
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        env.add_filter("trimprefix", filters::trimprefix);
        env.add_filter("trimsuffix", filters::trimsuffix);
        env.add_filter("quote", filters::quote);

        env
    }

    /// Render `template` against `context`
    pub fn render(
        &self,
        template: &str,
        context: &ReleaseContext,
        template_name: &str,
    ) -> Result<String> {
        let mut env = self.create_environment();

        env.add_template_owned(template_name.to_string(), template.to_string())
            .map_err(|e| {
                EngineError::Template(TemplateError::from_minijinja(
                    e,
                    template_name,
                    template,
                    context,
                ))
            })?;

        let tmpl = env.get_template(template_name).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(
                e,
                template_name,
                template,
                context,
            ))
        })?;

        tmpl.render(context).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(
                e,
                template_name,
                template,
                context,
            ))
        })
    }

    /// Render a configuration field.
    ///
    /// Values without template delimiters are returned as-is and never reach
    /// the engine, so literals may contain characters Jinja would reject.
    pub fn render_field(
        &self,
        raw: &str,
        context: &ReleaseContext,
        field: &str,
    ) -> Result<String> {
        if !has_template_syntax(raw) {
            return Ok(raw.to_string());
        }

        tracing::trace!("rendering field {}", field);
        self.render(raw, context, field)
    }
}
