use std::collections::BTreeSet;

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | ';' | ',' | '@')
}

/// Split a name into its comparable tokens.
///
/// `"AMD PRO A10-8730B R5"` gives `{AMD, PRO, A10, 8730, B, R5}`: a token made
/// of digits followed by letters contributes the digit run plus one token per
/// letter. Tokens containing "Duo" are dropped so "Core 2 Duo" models do not
/// collapse onto each other.
pub fn tokenize(name: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for raw in name
        .split(is_separator)
        .filter(|t| !t.is_empty() && !t.contains("Duo"))
    {
        match split_model_code(raw) {
            Some((digits, letters)) => {
                tokens.insert(digits.to_string());
                tokens.extend(letters.chars().map(String::from));
            }
            None => {
                tokens.insert(raw.to_string());
            }
        }
    }
    tokens
}

/// `"8730B"` -> `("8730", "B")`. Purely numeric tokens and anything else
/// that is not digits-then-letters give `None`.
fn split_model_code(token: &str) -> Option<(&str, &str)> {
    let split = token.find(|c: char| !c.is_ascii_digit())?;
    if split == 0 {
        return None;
    }
    let (digits, letters) = token.split_at(split);
    letters
        .chars()
        .all(char::is_alphabetic)
        .then_some((digits, letters))
}

/// Tokens as a sorted, space-joined string; used in diagnostics.
pub fn join_tokens(tokens: &BTreeSet<String>) -> String {
    tokens.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}
