//! Human-readable descriptions derived from identifiers.
//!
//! Phase operations and specs are reported by description, not by identifier. A method named
//! `the_final_score_should_be_zero` is reported as `the final score should be zero`; a type named
//! `GutterGame` is reported as `gutter game`.

/// Render an identifier as a description.
///
/// ## Notes
/// - `snake_case` identifiers keep their letter case; only separators become spaces
///   (`this_should_NOT_run` → `this should NOT run`).
/// - `CamelCase` identifiers are split on case boundaries and lower-cased (`HttpServerSpec` → `http server spec`).
/// - A leading `r#` (raw identifier) is dropped.
///
/// ## Examples
/// ```rust
/// use phasespec_core::describe_identifier;
///
/// assert_eq!(describe_identifier("a_fresh_game"), "a fresh game");
/// assert_eq!(describe_identifier("PerfectGame"), "perfect game");
/// ```
pub fn describe_identifier(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    if ident.contains('_') || !is_camel_case(ident) {
        return join_words(ident.split('_'));
    }
    let lowered: Vec<String> = split_camel(ident).iter().map(|w| w.to_lowercase()).collect();
    join_words(lowered.iter().map(String::as_str))
}

/// Render a fully qualified type name (as produced by `std::any::type_name`) as a description.
///
/// Module path and generic arguments are dropped.
///
/// ## Examples
/// ```rust
/// use phasespec_core::describe_type_name;
///
/// assert_eq!(describe_type_name("demo::bowling::SpareGame<u8>"), "spare game");
/// ```
pub fn describe_type_name(type_name: &str) -> String {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    let last = without_generics.rsplit("::").next().unwrap_or(without_generics);
    describe_identifier(last)
}

fn is_camel_case(ident: &str) -> bool {
    ident.chars().next().is_some_and(char::is_uppercase) && ident.chars().any(char::is_lowercase)
}

fn split_camel(ident: &str) -> Vec<String> {
    let chars: Vec<char> = ident.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        let boundary = if i == 0 || !ch.is_uppercase() {
            false
        } else {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            // `aB` starts a word; so does the last capital of an acronym in `HTTPServer`.
            prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn join_words<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_keeps_letter_case() {
        assert_eq!(describe_identifier("this_should_NOT_execute"), "this should NOT execute");
    }

    #[test]
    fn test_repeated_and_edge_underscores_collapse() {
        assert_eq!(describe_identifier("__private__name_"), "private name");
    }

    #[test]
    fn test_camel_case_splits_and_lowercases() {
        assert_eq!(describe_identifier("SpecWithFailure"), "spec with failure");
        assert_eq!(describe_identifier("HTTPServerSpec"), "http server spec");
        assert_eq!(describe_identifier("Frame10Bonus"), "frame10 bonus");
    }

    #[test]
    fn test_single_words() {
        assert_eq!(describe_identifier("cleanup"), "cleanup");
        assert_eq!(describe_identifier("Strike"), "strike");
        assert_eq!(describe_identifier("r#loop"), "loop");
    }

    #[test]
    fn test_type_name_drops_path_and_generics() {
        assert_eq!(describe_type_name("a::b::AllOnes"), "all ones");
        assert_eq!(describe_type_name("Wrapper<a::b::Inner>"), "wrapper");
        assert_eq!(describe_type_name("plain"), "plain");
    }
}
