//! String transforms between tab titles and URL segments.

/// Characters that would split or end a path segment.
const RESERVED: &[char] = &['/', '\\', '?', '#', '%'];

/// Collapses each run of whitespace or path-reserved characters into one `-`
/// and lowercases the result, so `"CI/CD"` becomes `"ci-cd"`.
///
/// Surrounding whitespace is not trimmed, so `" Tools"` becomes `"-tools"`.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() || RESERVED.contains(&ch) {
            if !in_space {
                out.push('-');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        out.extend(ch.to_lowercase());
    }
    out
}

/// Removes every whitespace character and lowercases what is left.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Turns a slug back into a heading: hyphens become spaces and every word
/// that starts with an ASCII word character gets its first letter upper-cased.
pub fn slug_to_title(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut in_word = false;
    for ch in slug.chars().map(|c| if c == '-' { ' ' } else { c }) {
        if ch.is_whitespace() {
            in_word = false;
            out.push(ch);
            continue;
        }
        if !in_word && is_word_char(ch) {
            in_word = true;
            out.push(ch.to_ascii_uppercase());
            continue;
        }
        out.push(ch);
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
