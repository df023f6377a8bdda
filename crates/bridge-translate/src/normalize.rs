//! Text normalization shared by the pattern tables

/// Case-fold and trim
pub fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Case-folded words separated by single spaces, padded with one space on
/// each side.
///
/// Punctuation becomes a word break, so table patterns can anchor on word
/// starts (`" spel"`) or whole words (`" app "`) with plain substring checks.
pub fn padded_words(text: &str) -> String {
    let folded = fold(text);
    let mut out = String::with_capacity(folded.len() + 2);
    out.push(' ');
    for word in folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        out.push_str(word);
        out.push(' ');
    }
    out
}
