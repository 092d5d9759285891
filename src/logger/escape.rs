//! LTSV value escaping.

/// Escapes characters that would break an LTSV record.
///
/// # Replacements
///
/// | Input | Output |
/// |-------|--------|
/// | newline | `\n` |
/// | carriage return | `\r` |
/// | tab | `\t` |
/// | backslash | `\\` |
///
/// The input is scanned once, so backslashes produced by an escape are
/// never escaped again.
///
/// # Examples
///
/// ```
/// use ltsv_access_log::logger::escape;
///
/// assert_eq!(escape("a\tb\\c\n"), "a\\tb\\\\c\\n");
/// assert_eq!(escape("plain"), "plain");
/// ```
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}
