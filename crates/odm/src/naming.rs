//! Naming helpers used to derive default attribute names from model names

/// Strip the namespace prefix from a model name (`Blog::Post` -> `Post`)
pub fn demodulize(name: &str) -> &str {
    match name.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

/// Convert a CamelCase name to snake_case.
///
/// A boundary is inserted only between a lowercase letter or digit and a
/// following uppercase letter, so acronyms stay glued (`HTMLParser` ->
/// `htmlparser`).
pub fn underscore(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;

    for c in name.chars() {
        if let Some(prev) = previous {
            if c.is_ascii_uppercase() && (prev.is_ascii_lowercase() || prev.is_ascii_digit()) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
        previous = Some(c);
    }

    result
}

/// Default reverse-attribute name for associations declared on `class_name`
///
/// `WeirdPost` -> `weird_post`, `Blog::Comment` -> `comment`
pub fn reverse_attribute_name(class_name: &str) -> String {
    underscore(demodulize(class_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demodulize() {
        assert_eq!(demodulize("Post"), "Post");
        assert_eq!(demodulize("Blog::Post"), "Post");
        assert_eq!(demodulize("App::Blog::WeirdPost"), "WeirdPost");
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("Post"), "post");
        assert_eq!(underscore("WeirdPost"), "weird_post");
        assert_eq!(underscore("Post2Comment"), "post2_comment");
        assert_eq!(underscore("HTMLParser"), "htmlparser");
        assert_eq!(underscore("already_snake"), "already_snake");
    }

    #[test]
    fn test_reverse_attribute_name() {
        assert_eq!(reverse_attribute_name("WeirdPost"), "weird_post");
        assert_eq!(reverse_attribute_name("Blog::WeirdPost"), "weird_post");
        assert_eq!(reverse_attribute_name("User"), "user");
    }
}
