//! Terminal rendering for batch failures and content digests.

/// Fold whitespace runs to single spaces and cut the result at `width`
/// characters, marking the cut with `...`.
pub fn single_line(text: &str, width: usize) -> String {
    let mut line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some((cut, _)) = line.char_indices().nth(width) {
        line.truncate(cut);
        line.push_str("...");
    }
    line
}

/// First `limit` messages on one line, separated by `; `.
pub fn summarize(messages: &[String], limit: usize, width: usize) -> String {
    let mut summary = messages
        .iter()
        .take(limit)
        .map(|m| single_line(m, width))
        .collect::<Vec<_>>()
        .join("; ");
    let hidden = messages.len().saturating_sub(limit);
    if hidden > 0 {
        summary.push_str(&format!(" and {} more", hidden));
    }
    summary
}

/// Short hex prefix used when reporting the digest of a written body.
pub fn short_digest(hex: &str) -> &str {
    &hex[..hex.len().min(8)]
}
