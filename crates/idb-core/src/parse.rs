//! Document parsing strategies.
//!
//! Database files come in several shapes with no marker saying which:
//! a header/body/footer envelope, a bare record sequence, or a mapping
//! from arbitrary keys to records. Each shape gets a strategy; the
//! chain tries them in fixed order and the first one to yield records
//! wins. A strategy that doesn't match the document's actual shape
//! returns `None` and the chain moves on — malformed input never
//! aborts a load. Exhausting every strategy yields an empty document.

use crate::map::map_record;
use idb_common::{Diagnostic, Item};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

/// Which strategy produced a parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Header/Body/Footer envelope, the canonical shape.
    Envelope,
    /// Bare sequence of records.
    FlatList,
    /// Mapping from arbitrary keys to records; keys are discarded.
    KeyedMap,
    /// Heuristic walk of an untyped node tree.
    GenericNode,
}

impl std::fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseStrategy::Envelope => write!(f, "envelope"),
            ParseStrategy::FlatList => write!(f, "flat-list"),
            ParseStrategy::KeyedMap => write!(f, "keyed-map"),
            ParseStrategy::GenericNode => write!(f, "generic-node"),
        }
    }
}

/// Document header, carried for diagnostics only.
///
/// Nothing branches on it: a mislabeled header still parses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Header {
    #[serde(rename = "Type")]
    pub kind: String,
    pub version: i64,
}

/// Everything extracted from one document.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Valid records, in document order.
    pub records: Vec<Item>,
    /// Raw import path strings from the footer, in declaration order.
    pub imports: Vec<String>,
    /// Header, when the envelope strategy saw one.
    pub header: Option<Header>,
    /// Winning strategy; `None` when every strategy was exhausted.
    pub strategy: Option<ParseStrategy>,
    /// Mapper diagnostics from the winning strategy only.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    header: Option<Header>,
    body: Option<Vec<Value>>,
    footer: Option<Footer>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct Footer {
    imports: Vec<ImportDecl>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImportDecl {
    path: String,
}

/// Parse decoded text into records and import declarations.
pub fn parse_document(text: &str) -> ParsedDocument {
    if let Some(doc) = try_envelope(text) {
        debug!(
            records = doc.records.len(),
            imports = doc.imports.len(),
            "envelope strategy matched"
        );
        return doc;
    }
    if let Some(doc) = try_flat_list(text) {
        debug!(records = doc.records.len(), "flat-list strategy matched");
        return doc;
    }
    if let Some(doc) = try_keyed_map(text) {
        debug!(records = doc.records.len(), "keyed-map strategy matched");
        return doc;
    }
    if let Some(doc) = try_generic_node(text) {
        debug!(records = doc.records.len(), "generic-node strategy matched");
        return doc;
    }

    debug!("all parsing strategies exhausted");
    ParsedDocument::default()
}

/// Map body nodes, keeping only valid records.
fn map_nodes<'a>(
    nodes: impl IntoIterator<Item = &'a Value>,
    diags: &mut Vec<Diagnostic>,
) -> Vec<Item> {
    let mut records = Vec::new();
    for node in nodes {
        let item = map_record(node, diags);
        if item.is_valid() {
            records.push(item);
        } else {
            debug!(id = item.id, "dropping record without positive id");
        }
    }
    records
}

fn try_envelope(text: &str) -> Option<ParsedDocument> {
    let envelope: Envelope = serde_yaml::from_str(text).ok()?;
    if envelope.header.is_none() && envelope.body.is_none() && envelope.footer.is_none() {
        return None;
    }

    let mut diagnostics = Vec::new();
    let body = envelope.body.unwrap_or_default();
    let had_body = !body.is_empty();
    let records = map_nodes(&body, &mut diagnostics);
    let imports: Vec<String> = envelope
        .footer
        .map(|f| f.imports.into_iter().map(|decl| decl.path).collect())
        .unwrap_or_default();

    // A non-empty body wins outright even when every record in it was
    // dropped, and an import manifest wins with no body at all. Only an
    // envelope that carried neither falls through to later strategies.
    if !had_body && imports.is_empty() {
        return None;
    }

    Some(ParsedDocument {
        records,
        imports,
        header: envelope.header,
        strategy: Some(ParseStrategy::Envelope),
        diagnostics,
    })
}

fn try_flat_list(text: &str) -> Option<ParsedDocument> {
    let nodes: Vec<Value> = serde_yaml::from_str(text).ok()?;
    let mut diagnostics = Vec::new();
    let records = map_nodes(&nodes, &mut diagnostics);
    if records.is_empty() {
        return None;
    }
    Some(ParsedDocument {
        records,
        strategy: Some(ParseStrategy::FlatList),
        diagnostics,
        ..ParsedDocument::default()
    })
}

fn try_keyed_map(text: &str) -> Option<ParsedDocument> {
    let map: serde_yaml::Mapping = serde_yaml::from_str(text).ok()?;
    let mut diagnostics = Vec::new();
    let records = map_nodes(map.values(), &mut diagnostics);
    if records.is_empty() {
        return None;
    }
    Some(ParsedDocument {
        records,
        strategy: Some(ParseStrategy::KeyedMap),
        diagnostics,
        ..ParsedDocument::default()
    })
}

/// Last resort: walk the untyped tree looking for anything record-like.
fn try_generic_node(text: &str) -> Option<ParsedDocument> {
    let root: Value = serde_yaml::from_str(text).ok()?;
    let mut diagnostics = Vec::new();

    let records = match &root {
        Value::Mapping(map) => {
            let body = map.iter().find_map(|(key, value)| match (key, value) {
                (Value::String(k), Value::Sequence(seq)) if k.eq_ignore_ascii_case("body") => {
                    Some(seq)
                }
                _ => None,
            });
            match body {
                Some(seq) => map_nodes(seq, &mut diagnostics),
                None => map_nodes(map.values(), &mut diagnostics),
            }
        }
        Value::Sequence(seq) => map_nodes(seq, &mut diagnostics),
        _ => return None,
    };

    if records.is_empty() {
        return None;
    }
    Some(ParsedDocument {
        records,
        strategy: Some(ParseStrategy::GenericNode),
        diagnostics,
        ..ParsedDocument::default()
    })
}
