use crate::core::{Document, Result, SolrError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MATCH_ALL: &str = "*:*";
pub const DEFAULT_ROWS: usize = 10;

const HIGHLIGHT_PRE: &str = "<mark class=\"bg-yellow-200 px-1 rounded\">";
const HIGHLIGHT_POST: &str = "</mark>";

/// Substring search over one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub field: Option<String>,
    pub rows: usize,
    pub start: usize,
    pub highlight: bool,
}

impl SearchRequest {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            field: None,
            rows: DEFAULT_ROWS,
            start: 0,
            highlight: true,
        }
    }

    /// Request that matches every document, useful for counting
    pub fn match_all() -> Self {
        Self::new("")
    }

    pub fn field(mut self, field: &str) -> Self {
        let field = field.trim();
        self.field = if field.is_empty() { None } else { Some(field.to_string()) };
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Solr `q` parameter for this request
    pub fn to_query(&self) -> Result<String> {
        build_query(&self.query, self.field.as_deref())
    }

    /// Complete parameter list for `select`
    pub fn to_params(&self) -> Result<Vec<(String, String)>> {
        let q = self.to_query()?;
        let mut params = vec![
            ("q".to_string(), q),
            ("rows".to_string(), self.rows.to_string()),
            ("start".to_string(), self.start.to_string()),
        ];
        if self.highlight {
            params.extend(highlight_params(self.field.as_deref()));
        }
        Ok(params)
    }
}

/// Blank input matches everything; otherwise the term is searched as a
/// substring (`field:*term*`). A term without a field is rejected.
pub fn build_query(query: &str, field: Option<&str>) -> Result<String> {
    if query.trim().is_empty() {
        return Ok(MATCH_ALL.to_string());
    }

    match field.map(str::trim).filter(|f| !f.is_empty()) {
        Some(field) => Ok(format!("{}:*{}*", field, escape_wildcard_term(query))),
        None => Err(SolrError::InvalidQuery(
            "a field is required for text search".to_string(),
        )),
    }
}

/// Escape characters that would change the meaning of a wildcard term
pub fn escape_wildcard_term(term: &str) -> String {
    term.replace('"', "\\\"")
        .replace('*', "\\*")
        .replace('?', "\\?")
}

/// `field:"value"` lookup with the value quoted as a phrase
pub fn id_query(unique_key_field: &str, doc_id: &str) -> String {
    let escaped = doc_id.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{}:\"{}\"", unique_key_field, escaped)
}

pub fn highlight_params(field: Option<&str>) -> Vec<(String, String)> {
    let fl = field.unwrap_or("*");
    [
        ("hl", "true"),
        ("hl.fl", fl),
        ("hl.simple.pre", HIGHLIGHT_PRE),
        ("hl.simple.post", HIGHLIGHT_POST),
        ("hl.fragsize", "150"),
        ("hl.snippets", "3"),
        ("hl.maxAnalyzedChars", "1000000"),
        ("hl.requireFieldMatch", "false"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Highlight snippets keyed by document id, then field name
pub type Highlighting = HashMap<String, HashMap<String, Vec<String>>>;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub docs: Vec<Document>,
    pub num_found: u64,
    pub start: usize,
    pub rows: usize,
    pub query: String,
    pub highlighting: Highlighting,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.num_found == 0
    }

    /// Snippets for one document, flattened as `(field, snippet)` pairs
    pub fn snippets_for(&self, doc_id: &str) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        if let Some(fields) = self.highlighting.get(doc_id) {
            let mut names: Vec<&String> = fields.keys().collect();
            names.sort();
            for name in names {
                for snippet in &fields[name] {
                    out.push((name.as_str(), snippet.as_str()));
                }
            }
        }
        out
    }
}

// Wire shape of `select?wt=json`

#[derive(Debug, Deserialize)]
pub(crate) struct SelectResponse {
    pub response: SelectBody,
    #[serde(default)]
    pub highlighting: Highlighting,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectBody {
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<Document>,
}
