//! Fuzzy matching suggestions for template errors
//!
//! When a template references a context key or filter that does not exist,
//! the closest known names (by Levenshtein distance) are offered as hints.

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Filters available to templates
pub const AVAILABLE_FILTERS: &[&str] = &[
    // Herald filters
    "quote",
    "trimprefix",
    "trimsuffix",
    // Built-in MiniJinja filters
    "default",
    "upper",
    "lower",
    "title",
    "capitalize",
    "replace",
    "trim",
    "join",
    "first",
    "last",
    "length",
    "split",
    "string",
    "tojson",
    "urlencode",
];

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub text: String,
    pub distance: usize,
}

/// Find the closest candidates to `input`, best first
pub fn find_closest_matches(input: &str, candidates: &[&str], max_results: usize) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = strsim::levenshtein(input, candidate);
            (distance <= MAX_SUGGESTION_DISTANCE && distance > 0).then(|| Suggestion {
                text: candidate.to_string(),
                distance,
            })
        })
        .collect();

    suggestions.sort_by_key(|s| s.distance);
    suggestions.truncate(max_results);
    suggestions
}

/// Suggest context keys close to an undefined variable
pub fn suggest_undefined_variable(variable_name: &str, available_keys: &[&str]) -> Option<String> {
    let matches = find_closest_matches(variable_name, available_keys, 3);
    if matches.is_empty() {
        return None;
    }

    let suggestions: Vec<String> = matches.iter().map(|s| format!("`{}`", s.text)).collect();
    Some(format!("Did you mean {}?", suggestions.join(" or ")))
}

/// Suggest corrections for an unknown filter
pub fn suggest_unknown_filter(filter_name: &str) -> Option<String> {
    let matches = find_closest_matches(filter_name, AVAILABLE_FILTERS, 3);

    if !matches.is_empty() {
        let suggestions: Vec<String> = matches.iter().map(|s| format!("`{}`", s.text)).collect();
        Some(format!("Did you mean {}?", suggestions.join(" or ")))
    } else {
        Some(format!(
            "Unknown filter `{}`. Available filters: {}",
            filter_name,
            AVAILABLE_FILTERS.join(", ")
        ))
    }
}

/// Extract a quoted name from an error message
pub fn extract_variable_name(msg: &str) -> Option<String> {
    let patterns = [("`", "`"), ("'", "'"), ("\"", "\"")];

    for (start, end) in patterns {
        if let Some(start_idx) = msg.find(start) {
            let rest = &msg[start_idx + start.len()..];
            if let Some(end_idx) = rest.find(end) {
                return Some(rest[..end_idx].to_string());
            }
        }
    }
    None
}

pub fn extract_filter_name(msg: &str) -> Option<String> {
    extract_variable_name(msg)
}
