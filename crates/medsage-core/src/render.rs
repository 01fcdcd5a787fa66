//! Sanitize-then-render transform for assistant text.
//!
//! Assistant replies are plain text with light markdown-ish emphasis.
//! The whole input is HTML-escaped first; only then is a closed set of
//! safe tags introduced: `**bold**` becomes `<strong>…</strong>` and
//! newlines become `<br>`. No markup from the input can ever pass
//! through unescaped.

/// Render assistant text as safe HTML.
pub fn to_safe_html(text: &str) -> String {
    with_line_breaks(&with_bold(&escape(text)))
}

/// HTML-escape every markup-significant character.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace `**…**` pairs with `<strong>` tags. An unterminated `**`
/// stays literal.
fn with_bold(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str("<strong>");
        out.push_str(&after[..end]);
        out.push_str("</strong>");
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn with_line_breaks(text: &str) -> String {
    text.replace('\n', "<br>")
}
