use std::collections::HashSet;

/// Strips all HTML tags from user-submitted text, leaving plain text only.
/// Story titles, excerpts, and bodies are stored and rendered as plain text,
/// so nothing tag-shaped should survive the contact form.
pub fn strip_all_html(input: &str) -> String {
    ammonia::Builder::new()
        .tags(HashSet::new()) // Allow no tags
        .clean(input)
        .to_string()
}
