use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap();
}

/// Returns true if `name` may be spliced into SQL text as a table or column name.
///
/// Identifiers are the only part of a statement that is not bound as a
/// parameter, so anything outside `[A-Za-z0-9_]` (plus one schema dot) is refused.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Converts a type name to snake_case.
///
/// `OrderLine` -> `order_line`, `HTTPRequest` -> `http_request`. Non-ASCII
/// letters are kept (lowercased) so identifier validation can refuse them.
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_numeric() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }

    out
}

fn pluralize(word: &str) -> String {
    const SIBILANT_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    if SIBILANT_ENDINGS.iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{}es", word);
    }

    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        if before_y.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", word)
}

/// Default table name for an entity type: snake_case, last segment pluralized.
///
/// `Order` -> `orders`, `OrderLine` -> `order_lines`, `Category` -> `categories`.
pub fn default_table_name(entity_name: &str) -> String {
    let short = entity_name.rsplit("::").next().unwrap_or(entity_name);
    let snake = to_snake_case(short);
    if snake.is_empty() {
        return snake;
    }
    pluralize(&snake)
}
