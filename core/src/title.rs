/// Accented capitals and their unaccented base letter, applied in order.
///
/// The same table drives [`normalize_title`] and the `$replaceAll` chain the
/// title sort renders for the store.
pub const ACCENT_FOLDS: [(&str, &str); 11] = [
    ("Á", "A"),
    ("À", "A"),
    ("É", "E"),
    ("È", "E"),
    ("Í", "I"),
    ("Ì", "I"),
    ("Ó", "O"),
    ("Ò", "O"),
    ("Ú", "U"),
    ("Ù", "U"),
    ("Ñ", "N"),
];

/// Pattern locating the sort-relevant part of a folded title.
pub const FIRST_LETTER_PATTERN: &str = "[a-zA-Z].*";

pub fn fold_accents(title: &str) -> String {
    ACCENT_FOLDS
        .iter()
        .fold(title.to_string(), |folded, (accented, base)| folded.replace(accented, base))
}

/// Alphabetical sort key: accents folded, then everything before the first
/// ASCII letter dropped ("¡Hola" sorts as "Hola"). Titles without any letter
/// are kept as folded.
pub fn normalize_title(title: &str) -> String {
    let folded = fold_accents(title);
    match folded.find(|c: char| c.is_ascii_alphabetic()) {
        Some(start) => folded[start..].to_string(),
        None => folded,
    }
}
