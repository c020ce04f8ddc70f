//! Naming helpers shared by the stack and resource name derivations

/// Removes `-` / `_` separators, upper-casing the letter that follows.
///
/// Only a separator directly followed by an ASCII letter is collapsed;
/// `"app-42"` stays `"app-42"`.
pub fn to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if (c == '-' || c == '_')
            && let Some(next) = chars.peek()
            && next.is_ascii_alphabetic()
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
            continue;
        }
        out.push(c);
    }

    out
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncates to `count` characters, appending `...` when something was cut.
pub fn slice_word(s: &str, count: usize) -> String {
    let truncated: String = s.chars().take(count).collect();
    if s.chars().count() > count {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
