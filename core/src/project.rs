use crate::document::{PersonName, ProjectedDocument, StoredDocument};

/// Reshapes a stored record into the API document.
pub fn project(doc: StoredDocument) -> ProjectedDocument {
    ProjectedDocument {
        id: doc.id.0,
        date: display_date(doc.year, doc.month, doc.day),
        title: doc.title,
        source: doc.source,
        doc_type: doc.doc_type,
        publisher: doc.publisher,
        book: doc.book,
        folder_names: doc.folder_names,
        year: doc.year,
        month: doc.month,
        day: doc.day,
        authors: people(doc.authors),
        editor: people(doc.editor),
        translator: people(doc.translator),
        illustrator: people(doc.illustrator),
        coordinator: people(doc.coordinator),
        director: people(doc.director),
        pages: doc.pages,
        city: doc.city,
    }
}

/// Richest displayable form of a partial date: `DD/MM/YYYY`, `MM/YYYY`,
/// `DD/MM` or `YYYY`. Any other combination has no display date.
pub fn display_date(year: Option<i32>, month: Option<i32>, day: Option<i32>) -> Option<String> {
    match (year, month, day) {
        (Some(year), Some(month), Some(day)) => Some(format!("{day:02}/{month:02}/{year}")),
        (Some(year), Some(month), None) => Some(format!("{month:02}/{year}")),
        (None, Some(month), Some(day)) => Some(format!("{day:02}/{month:02}")),
        (Some(year), None, _) => Some(year.to_string()),
        _ => None,
    }
}

fn people(names: Option<Vec<String>>) -> Option<Vec<PersonName>> {
    names.map(|names| names.into_iter().map(|name| PersonName { name }).collect())
}
