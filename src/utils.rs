// src/utils.rs
// Shared helpers: output truncation and timestamps

/// Maximum captured output size (64KB)
pub const MAX_OUTPUT_SIZE: usize = 64 * 1024;

/// Truncate combined stdout/stderr, allocating the budget proportionally
pub fn truncate_output(stdout: &str, stderr: &str, max_size: usize) -> (String, String) {
    let total = stdout.len() + stderr.len();
    if total <= max_size {
        return (stdout.to_string(), stderr.to_string());
    }

    let stdout_ratio = stdout.len() as f64 / total as f64;
    let stdout_budget = (max_size as f64 * stdout_ratio) as usize;
    let stderr_budget = max_size - stdout_budget;

    (
        truncate_single(stdout, stdout_budget),
        truncate_single(stderr, stderr_budget),
    )
}

/// Truncate a single string keeping head and tail
pub fn truncate_single(s: &str, max_size: usize) -> String {
    if s.len() <= max_size {
        return s.to_string();
    }

    // Keep first ~75% and last ~20%
    let head_size = (max_size * 3) / 4;
    let tail_size = max_size / 5;

    let head = safe_prefix(s, head_size);
    let tail = safe_suffix(s, tail_size);

    let omitted = s.len() - head.len() - tail.len();
    format!("{}\n\n... [{} bytes omitted] ...\n\n{}", head, omitted, tail)
}

/// Longest prefix of at most `max` bytes ending on a char boundary
fn safe_prefix(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Longest suffix of at most `max` bytes starting on a char boundary
fn safe_suffix(s: &str, max: usize) -> &str {
    let mut start = s.len().saturating_sub(max);
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Current time as RFC 3339, used in tool envelopes
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_single_short_is_untouched() {
        assert_eq!(truncate_single("hello", 50), "hello");
    }

    #[test]
    fn test_truncate_single_long() {
        let long_string = "x".repeat(100);
        let truncated = truncate_single(&long_string, 50);
        assert!(truncated.contains("bytes omitted"));
        assert!(truncated.starts_with(&"x".repeat(37)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "é".repeat(100);
        let truncated = truncate_single(&s, 51);
        assert!(truncated.contains("bytes omitted"));
    }

    #[test]
    fn test_truncate_output_proportional() {
        let stdout = "o".repeat(300);
        let stderr = "e".repeat(100);
        let (out, err) = truncate_output(&stdout, &stderr, 200);
        assert!(out.contains("bytes omitted"));
        assert!(err.contains("bytes omitted"));
        assert!(out.len() > err.len());
    }

    #[test]
    fn test_truncate_output_within_budget() {
        let (out, err) = truncate_output("abc", "def", 100);
        assert_eq!(out, "abc");
        assert_eq!(err, "def");
    }
}
