//! English plural heuristic for resource names.

/// Pluralises a resource name for a table title.
///
/// A trailing consonant + `y` becomes `ies`; everything else gets an `s`.
///
/// ```
/// use tablekit::pluralize;
///
/// assert_eq!(pluralize("Party"), "Parties");
/// assert_eq!(pluralize("Account"), "Accounts");
/// assert_eq!(pluralize("Key"), "Keys");
/// ```
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let mut tail = name.chars().rev();
    match (tail.next(), tail.next()) {
        (Some(last), Some(prev)) if last.eq_ignore_ascii_case(&'y') && !is_vowel(prev) => {
            format!("{}ies", &name[..name.len() - 1])
        }
        _ => format!("{name}s"),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
