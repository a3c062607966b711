// src/utils/html.rs

/// Longest string stored for a free-text user field.
const MAX_FIELD_LEN: usize = 1000;

/// Clean user-supplied text before it is stored.
///
/// Uses ammonia's whitelist sanitizer, so `<script>` blocks and event-handler
/// attributes are dropped, then trims and caps the length.
pub fn clean_html(input: &str) -> String {
    let cleaned = ammonia::clean(input.trim());
    match cleaned.char_indices().nth(MAX_FIELD_LEN) {
        Some((cut, _)) => cleaned[..cut].to_string(),
        None => cleaned,
    }
}
