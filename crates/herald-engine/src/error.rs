//! Engine error types with source-annotated diagnostics

use herald_core::ReleaseContext;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::suggestions::{
    extract_filter_name, extract_variable_name, suggest_undefined_variable,
    suggest_unknown_filter,
};

/// Main engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// Error kind for categorizing template errors
///
/// Note: This enum is non-exhaustive - new variants may be added in future versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedVariable,
    UnknownFilter,
    UnknownFunction,
    SyntaxError,
    TypeError,
    InvalidOperation,
    Other,
}

impl TemplateErrorKind {
    /// Convert to a code string for diagnostics
    pub fn to_code_string(&self) -> &'static str {
        match self {
            Self::UndefinedVariable => "undefined_variable",
            Self::UnknownFilter => "unknown_filter",
            Self::UnknownFunction => "unknown_function",
            Self::SyntaxError => "syntax",
            Self::TypeError => "type",
            Self::InvalidOperation => "invalid_operation",
            Self::Other => "render",
        }
    }
}

/// Template-specific error with source information
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(herald::template::render))]
pub struct TemplateError {
    pub message: String,

    pub kind: TemplateErrorKind,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub suggestion: Option<String>,
}

impl TemplateError {
    /// Create a template error from a MiniJinja error
    pub fn from_minijinja(
        err: minijinja::Error,
        template_name: &str,
        template_source: &str,
        context: &ReleaseContext,
    ) -> Self {
        let (kind, message) = categorize_minijinja_error(&err);
        let span = err
            .line()
            .and_then(|line_num| calculate_span(template_source, line_num));
        let suggestion = generate_suggestion(&err, kind, context);

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span,
            suggestion,
        }
    }

    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

/// Categorize a MiniJinja error into our error kinds
fn categorize_minijinja_error(err: &minijinja::Error) -> (TemplateErrorKind, String) {
    let msg = err.to_string();
    let msg_lower = msg.to_lowercase();

    let kind = match err.kind() {
        minijinja::ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
        minijinja::ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
        minijinja::ErrorKind::UnknownFunction => TemplateErrorKind::UnknownFunction,
        minijinja::ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
        minijinja::ErrorKind::InvalidOperation => TemplateErrorKind::InvalidOperation,
        minijinja::ErrorKind::NonPrimitive | minijinja::ErrorKind::NonKey => {
            TemplateErrorKind::TypeError
        }
        _ => {
            if msg_lower.contains("undefined") {
                TemplateErrorKind::UndefinedVariable
            } else if msg_lower.contains("syntax") {
                TemplateErrorKind::SyntaxError
            } else {
                TemplateErrorKind::Other
            }
        }
    };

    let enhanced_msg = match kind {
        TemplateErrorKind::UndefinedVariable => {
            match extract_expression_from_display(&format!("{:#}", err)) {
                Some(expr) => format!("undefined variable `{}`", expr),
                None => msg.replace("undefined value", "undefined variable"),
            }
        }
        _ => msg
            .replace("invalid operation: ", "")
            .replace("syntax error: ", ""),
    };

    (kind, enhanced_msg)
}

/// Extract the failing `{{ expression }}` from MiniJinja's detailed display
///
/// The display marks the error line with `>`:
/// ```text
///    1 > https://host/{{ projectVersoin }}.zip
///      i              ^^^^^^^^^^^^^^^^^^^^ undefined value
/// ```
fn extract_expression_from_display(display: &str) -> Option<String> {
    display
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            trimmed.contains(" > ") || trimmed.starts_with("> ")
        })
        .find_map(|line| {
            let start = line.find("{{")?;
            let end = line[start..].find("}}")?;
            let expr = line[start + 2..start + end].trim();
            let expr = expr.split('|').next().unwrap_or(expr).trim();
            (!expr.is_empty()).then(|| expr.to_string())
        })
}

/// Calculate the source span for a given line number
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;

    for (idx, line) in source.lines().enumerate() {
        if idx + 1 == line_num {
            return Some(SourceSpan::new(offset.into(), line.len()));
        }
        offset += line.len() + 1;
    }

    None
}

fn generate_suggestion(
    err: &minijinja::Error,
    kind: TemplateErrorKind,
    context: &ReleaseContext,
) -> Option<String> {
    let msg = err.to_string();

    match kind {
        TemplateErrorKind::UndefinedVariable => {
            let available: Vec<&str> = context.keys().collect();
            let var_name = extract_expression_from_display(&format!("{:#}", err))
                .or_else(|| extract_variable_name(&msg));

            match var_name {
                Some(name) => suggest_undefined_variable(&name, &available).or_else(|| {
                    Some(format!(
                        "`{}` is not a context key. Available keys: {}",
                        name,
                        available.join(", ")
                    ))
                }),
                None => Some("Variable is not defined. Check the key spelling.".to_string()),
            }
        }

        TemplateErrorKind::UnknownFilter => {
            extract_filter_name(&msg).and_then(|name| suggest_unknown_filter(&name))
        }

        TemplateErrorKind::SyntaxError => Some(
            "Check bracket matching: `{{ }}` for expressions, `{% %}` for statements, `{# #}` for comments"
                .to_string(),
        ),

        _ => None,
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_kind_to_code_string() {
        assert_eq!(
            TemplateErrorKind::UndefinedVariable.to_code_string(),
            "undefined_variable"
        );
        assert_eq!(TemplateErrorKind::SyntaxError.to_code_string(), "syntax");
    }

    #[test]
    fn test_extract_expression_from_display_with_marker() {
        let display = r#"
   1 >   url: {{ projectVersoin }}
     i          ^^^^^^^^^^^^^^ undefined value
"#;
        assert_eq!(
            extract_expression_from_display(display),
            Some("projectVersoin".to_string())
        );
    }

    #[test]
    fn test_extract_expression_with_filter() {
        let display = "   3 >   name: {{ projectName | upper }}\n";
        assert_eq!(
            extract_expression_from_display(display),
            Some("projectName".to_string())
        );
    }

    #[test]
    fn test_calculate_span() {
        let source = "first\nsecond line\nthird";
        let span = calculate_span(source, 2).unwrap();
        assert_eq!(span.offset(), 6);
        assert_eq!(span.len(), 11);
        assert!(calculate_span(source, 9).is_none());
    }
}
