//! Manifest-oriented template filters
//!
//! These extend MiniJinja's builtins with the string helpers package
//! manifests commonly need.

use minijinja::Value;

/// Wrap a value in double quotes, escaping for JSON string context
///
/// Usage: {{ projectDescription | quote }}
pub fn quote(value: Value) -> String {
    let s = if let Some(str_val) = value.as_str() {
        str_val.to_string()
    } else {
        value.to_string()
    };
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Usage: {{ tagName | trimprefix("v") }}
pub fn trimprefix(value: String, prefix: String) -> String {
    value.strip_prefix(&prefix).unwrap_or(&value).to_string()
}

/// Usage: {{ artifactFile | trimsuffix(".zip") }}
pub fn trimsuffix(value: String, suffix: String) -> String {
    value.strip_suffix(&suffix).unwrap_or(&value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote(Value::from("plain")), "\"plain\"");
        assert_eq!(quote(Value::from("say \"hi\"")), "\"say \\\"hi\\\"\"");
        assert_eq!(quote(Value::from(42)), "\"42\"");
        assert_eq!(quote(Value::from("C:\\tools")), "\"C:\\\\tools\"");
        assert_eq!(quote(Value::from("line\nbreak\u{1}")), "\"line\\nbreak\\u0001\"");
    }

    #[test]
    fn test_trim() {
        assert_eq!(trimprefix("v1.0.0".into(), "v".into()), "1.0.0");
        assert_eq!(trimprefix("1.0.0".into(), "v".into()), "1.0.0");
        assert_eq!(trimsuffix("app.zip".into(), ".zip".into()), "app");
    }
}
