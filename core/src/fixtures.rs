use crate::document::StoredDocument;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Loads stored documents from a `.jsonl` file (one record per line) or a
/// `.json` file holding either an array of records or a single record.
pub fn load_documents(path: &Path) -> Result<Vec<StoredDocument>> {
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        load_jsonl(path)
    } else {
        load_json(path)
    }
}

fn load_jsonl(path: &Path) -> Result<Vec<StoredDocument>> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(f);
    let mut docs = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(&line).with_context(|| format!("{}:{}", path.display(), index + 1))?;
        docs.push(doc);
    }
    Ok(docs)
}

fn load_json(path: &Path) -> Result<Vec<StoredDocument>> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let json: Value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", path.display()))?;
    match json {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item).with_context(|| format!("{}: record {}", path.display(), index))
            })
            .collect(),
        Value::Object(_) => Ok(vec![serde_json::from_value(json)?]),
        _ => bail!("{}: expected a JSON array or object", path.display()),
    }
}
