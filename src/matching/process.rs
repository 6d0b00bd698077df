use std::collections::BTreeSet;

/// Normalize text before comparison
///
/// Lowercases, turns every non-alphanumeric character into a space and
/// collapses runs of whitespace.
pub fn preprocess(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace tokens sorted alphabetically and rejoined
pub fn sorted_tokens(processed: &str) -> String {
    let mut tokens: Vec<&str> = processed.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Distinct whitespace tokens, sorted
pub fn token_set(processed: &str) -> BTreeSet<&str> {
    processed.split_whitespace().collect()
}
