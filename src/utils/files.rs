//! Filename pattern utilities
//!
//! Converts glob-style file name patterns into anchored, case-insensitive
//! regexes for matching directory entries and embedded resource names, and
//! strips known module extensions off file names.

use regex::{Regex, RegexBuilder};

/// Build a regex matching `pattern` as a trailing file name.
///
/// `pattern` may contain `*` (any run of characters except a path
/// separator) and `?` (any single character); dots match literally.
/// `extensions` are appended as an alternation, so `("mod-*", ["so"])`
/// matches `mod-net.so` at the end of any path. With no extensions the
/// pattern must match the complete file name. Matching is
/// case-insensitive.
pub fn filename_to_regex(pattern: &str, extensions: &[&str]) -> Result<Regex, regex::Error> {
    // Anything up to the last path separator is ignored.
    build_name_regex(r"^(?:.*[/\\])?", pattern, extensions)
}

/// Build a regex matching `pattern` as the trailing component of an
/// embedded resource name.
///
/// Resource names may carry dotted namespace prefixes (`pkg.assets.mod.so`)
/// or path prefixes (`assets/mod.so`); both are accepted before the match.
/// Wildcards and extensions behave as in [`filename_to_regex`].
pub fn resource_name_regex(pattern: &str, extensions: &[&str]) -> Result<Regex, regex::Error> {
    build_name_regex(r"^(?:.*[/\\.])?", pattern, extensions)
}

fn build_name_regex(
    prefix: &str,
    pattern: &str,
    extensions: &[&str],
) -> Result<Regex, regex::Error> {
    let mut source = String::from(prefix);
    source.push_str(&glob_to_regex(pattern));

    let cleaned: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').replace('.', r"\."))
        .collect();
    match cleaned.len() {
        0 => {}
        1 => {
            source.push_str(r"\.");
            source.push_str(&cleaned[0]);
        }
        _ => {
            source.push_str(r"(?:\.");
            source.push_str(&cleaned.join(r"|\."));
            source.push(')');
        }
    }
    source.push('$');

    RegexBuilder::new(&source).case_insensitive(true).build()
}

/// Translate one glob-style pattern component: escape regex metacharacters,
/// then `?` matches any single character and `*` any run that stays within
/// one path component.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    for c in pattern.chars() {
        match c {
            '?' => out.push('.'),
            '*' => out.push_str(r"[^/\\]*"),
            c if regex_syntax_char(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn regex_syntax_char(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\'
    )
}

/// Strip one known extension off the end of a file or resource name.
///
/// The longest extension in `extensions` that matches (case-insensitively,
/// with or without its leading dot) is removed once; a name matching none
/// of them is returned unchanged.
pub fn strip_extensions(name: &str, extensions: &[&str]) -> String {
    let mut cleaned: Vec<&str> = extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .collect();
    cleaned.sort_by_key(|ext| std::cmp::Reverse(ext.len()));

    for ext in cleaned {
        let suffix_len = ext.len() + 1;
        if name.len() > suffix_len && name.is_char_boundary(name.len() - suffix_len) {
            let (stem, suffix) = name.split_at(name.len() - suffix_len);
            if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(ext) {
                return stem.to_string();
            }
        }
    }
    name.to_string()
}
