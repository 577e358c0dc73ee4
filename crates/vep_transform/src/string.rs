use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase};

pub const DEFAULT_TRUNCATE_LENGTH: usize = 50;
pub const DEFAULT_TRUNCATE_SUFFIX: &str = "...";

pub fn camel_case(input: &str) -> String {
    input.to_lower_camel_case()
}

pub fn snake_case(input: &str) -> String {
    input.to_snake_case()
}

pub fn kebab_case(input: &str) -> String {
    input.to_kebab_case()
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Lower-case, ASCII-alphanumeric words joined by `-`
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Cut `input` to `length` characters and append `suffix` when it was longer
pub fn truncate(input: &str, length: usize, suffix: &str) -> String {
    if input.chars().count() <= length {
        return input.to_string();
    }
    let mut out: String = input.chars().take(length).collect();
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casing() {
        assert_eq!(camel_case("user_first name"), "userFirstName");
        assert_eq!(snake_case("userFirstName"), "user_first_name");
        assert_eq!(kebab_case("User First Name"), "user-first-name");
        assert_eq!(capitalize("hELLO"), "Hello");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hello, World! 2024 "), "hello-world-2024");
        assert_eq!(slugify("already-a_slug"), "already-a-slug");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10, "..."), "short");
        assert_eq!(truncate("a longer sentence", 8, "..."), "a longer...");
        assert_eq!(truncate("héllo", 2, "…"), "hé…");
    }
}
