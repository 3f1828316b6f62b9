use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque store identifier, always handed to callers as a string.
///
/// Accepts a plain string, an integer or an extended-JSON `{"$oid": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
            ObjectId {
                #[serde(rename = "$oid")]
                oid: String,
            },
        }
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => DocumentId(id),
            RawId::Number(id) => DocumentId(id.to_string()),
            RawId::ObjectId { oid } => DocumentId(oid),
        })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        DocumentId(id.to_string())
    }
}

/// Page count as catalogued: usually a number, sometimes free text
/// ("xii+240"). Whatever else is stored passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pages {
    Count(i64),
    Fractional(f64),
    Text(String),
    Other(Value),
}

/// A bibliographic record as it sits in the collection.
///
/// Every descriptive field is optional; absence means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub folder_names: Option<Vec<String>>,
    #[serde(default, deserialize_with = "date_part", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "date_part", skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    #[serde(default, deserialize_with = "date_part", skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub editor: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub translator: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub illustrator: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub director: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Pages>,
}

impl StoredDocument {
    pub fn facet(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Source => self.source.as_deref(),
            Facet::Type => self.doc_type.as_deref(),
            Facet::Publisher => self.publisher.as_deref(),
            Facet::City => self.city.as_deref(),
        }
    }
}

// Some records carry a bare string where a list of names is expected, or
// nulls inside the list. Non-string entries are dropped.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(name)) => Some(vec![name]),
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(name) => Some(name),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

// Date parts are integers, sometimes stored as integral doubles. Anything
// else is treated as unknown.
fn date_part<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let part = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX)).map(|f| f as i64)),
        _ => None,
    };
    Ok(part.and_then(|n| i32::try_from(n).ok()))
}

/// Enumerable filter dimensions, each backed by a distinct-value listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Source,
    Type,
    Publisher,
    City,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Source, Facet::Type, Facet::Publisher, Facet::City];

    /// Field name in the collection, which is also the query parameter name.
    pub fn field(self) -> &'static str {
        match self {
            Facet::Source => "source",
            Facet::Type => "type",
            Facet::Publisher => "publisher",
            Facet::City => "city",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub name: String,
}

/// API-facing document. Unknown values are explicit nulls for the fields
/// clients always render, and omitted for the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
    pub date: Option<String>,
    pub authors: Option<Vec<PersonName>>,
    pub editor: Option<Vec<PersonName>>,
    pub translator: Option<Vec<PersonName>>,
    pub illustrator: Option<Vec<PersonName>>,
    pub coordinator: Option<Vec<PersonName>>,
    pub director: Option<Vec<PersonName>>,
    pub pages: Option<Pages>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    pub total_documents: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub results: Vec<ProjectedDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_extended_json_ids_and_single_names() {
        let doc: StoredDocument = serde_json::from_value(serde_json::json!({
            "_id": {"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"},
            "title": "Ficciones",
            "authors": "Jorge Luis Borges",
            "pages": 203,
            "year": 1944
        }))
        .unwrap();
        assert_eq!(doc.id.0, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(doc.authors, Some(vec!["Jorge Luis Borges".to_string()]));
        assert_eq!(doc.pages, Some(Pages::Count(203)));
        assert_eq!(doc.editor, None);
    }

    #[test]
    fn odd_value_types_do_not_reject_the_record() {
        let doc: StoredDocument = serde_json::from_value(serde_json::json!({
            "_id": "a",
            "pages": 240.0,
            "year": 1950.0,
            "month": "marzo",
            "day": 2.5,
            "authors": ["Silvina Ocampo", null],
            "editor": 7
        }))
        .unwrap();
        assert_eq!(doc.pages, Some(Pages::Fractional(240.0)));
        assert_eq!(doc.year, Some(1950));
        assert_eq!(doc.month, None);
        assert_eq!(doc.day, None);
        assert_eq!(doc.authors, Some(vec!["Silvina Ocampo".to_string()]));
        assert_eq!(doc.editor, None);

        let doc: StoredDocument = serde_json::from_str(r#"{"_id": "b", "pages": true, "year": null}"#).unwrap();
        assert_eq!(doc.pages, Some(Pages::Other(Value::Bool(true))));
        assert_eq!(doc.year, None);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let doc: StoredDocument = serde_json::from_str(r#"{"_id": 42, "type": "libro"}"#).unwrap();
        assert_eq!(doc.id.to_string(), "42");
        assert_eq!(doc.facet(Facet::Type), Some("libro"));
        assert_eq!(doc.facet(Facet::City), None);
    }
}
