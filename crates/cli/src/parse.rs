//! Request parsing: JSON bodies and stdin request lines.

use haystack_executor::Table;

/// Parse a request body; blank text is an empty table
pub fn parse_body(text: &str) -> Result<Table, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Table::empty());
    }
    serde_json::from_str(text).map_err(|e| format!("Invalid request body: {}", e))
}

/// One stdin request: `<path> [json]`
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLine {
    pub path: String,
    pub body: Table,
}

/// Parse a request line; blank lines and `#` comments give `None`
pub fn parse_line(line: &str) -> Option<Result<RequestLine, String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (path, rest) = match line.split_once(char::is_whitespace) {
        Some((path, rest)) => (path, rest),
        None => (line, ""),
    };
    Some(parse_body(rest).map(|body| RequestLine {
        path: path.to_string(),
        body,
    }))
}
