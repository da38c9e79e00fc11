/// Returns the text strictly between the first occurrence of `start` and the
/// first occurrence of `end` that follows it.
///
/// Returns an empty string if either delimiter is missing.
///
/// # Examples
///
/// ```
/// use ace::text::extract_between;
///
/// assert_eq!(extract_between(r#""repo": "x""#, r#""repo": ""#, "\""), "x");
/// assert_eq!(extract_between("foo", r#""a""#, r#""b""#), "");
/// ```
pub fn extract_between<'a>(line: &'a str, start: &str, end: &str) -> &'a str {
    let Some(start_idx) = line.find(start) else {
        return "";
    };
    let rest = &line[start_idx + start.len()..];
    match rest.find(end) {
        Some(end_idx) => &rest[..end_idx],
        None => "",
    }
}

/// Returns everything after the first occurrence of `marker`, or `None`.
pub fn after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker).map(|idx| &line[idx + marker.len()..])
}

/// Reads the quoted value assigned to `key` on a `"key": "value"` line.
///
/// Whitespace around the colon is tolerated.
pub fn quoted_field<'a>(line: &'a str, key: &str) -> &'a str {
    match after(line, &format!("\"{key}\":")) {
        Some(rest) => extract_between(rest, "\"", "\""),
        None => "",
    }
}

/// Reads a `"key": ["a", "b"]` line into its list of strings.
///
/// An empty list yields an empty vector.
pub fn quoted_list(line: &str, key: &str) -> Vec<String> {
    let Some(rest) = after(line, &format!("\"{key}\":")) else {
        return Vec::new();
    };
    let inner = extract_between(rest, "[", "]");
    inner
        .split(',')
        .map(|item| item.trim().trim_matches('"'))
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Returns the quoted token that opens a `"token":` line, if any.
pub fn leading_key(line: &str) -> Option<&str> {
    if !line.contains("\":") {
        return None;
    }
    Some(extract_between(line, "\"", "\":"))
}

/// True for lines that carry no data: blank lines and bare bracket/comma runs.
pub fn is_structural(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | ','))
}
