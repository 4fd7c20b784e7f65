//! In-process stand-in for a Solr core.
//!
//! Serves `select`, `schema`, `config` and `update` for one core on an
//! ephemeral port. Documents live in memory and every update payload is
//! recorded so tests can assert on the exact wire traffic.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Map, Value, json};
use solrhelper::{ConnectionConfig, SolrConnection};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const CORE: &str = "books";

/// How the fake answers `GET config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    /// `config.updateHandler.updateLog` present
    Nested,
    /// Legacy `config.updateHandlerupdateLog` key present
    Flat,
    /// No update log declared
    Disabled,
    /// HTTP 500
    Error,
}

#[derive(Debug)]
pub struct FakeState {
    pub schema: Value,
    pub unique_key: String,
    pub config_mode: ConfigMode,
    pub docs: Vec<Map<String, Value>>,
    pub updates: Vec<Value>,
    pub select_queries: Vec<String>,
    pub config_requests: usize,
    pub reject_updates: Option<String>,
    next_version: u64,
}

impl FakeState {
    fn find_mut(&mut self, id: &str) -> Option<&mut Map<String, Value>> {
        let key = self.unique_key.clone();
        self.docs
            .iter_mut()
            .find(|d| d.get(&key).and_then(Value::as_str) == Some(id))
    }

    fn bump_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

pub type SharedState = Arc<Mutex<FakeState>>;

pub struct FakeSolr {
    pub base_url: String,
    pub state: SharedState,
}

impl FakeSolr {
    pub async fn start(config_mode: ConfigMode) -> Self {
        Self::start_with_schema(default_schema(), config_mode).await
    }

    pub async fn start_with_schema(schema: Value, config_mode: ConfigMode) -> Self {
        let unique_key = schema
            .get("uniqueKey")
            .and_then(Value::as_str)
            .unwrap_or("id")
            .to_string();

        let state = Arc::new(Mutex::new(FakeState {
            schema,
            unique_key,
            config_mode,
            docs: Vec::new(),
            updates: Vec::new(),
            select_queries: Vec::new(),
            config_requests: 0,
            reject_updates: None,
            next_version: 1000,
        }));

        let app = Router::new()
            .route("/solr/:core/select", get(select))
            .route("/solr/:core/schema", get(schema_handler))
            .route("/solr/:core/config", get(config_handler))
            .route("/solr/:core/update", post(update))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.base_url, CORE)
    }

    pub fn connection(&self) -> SolrConnection {
        SolrConnection::new(self.config()).unwrap()
    }

    /// Store a document as-is, assigning a `_version_`
    pub fn seed(&self, doc: Value) {
        let mut state = self.state.lock().unwrap();
        let mut doc = doc.as_object().cloned().unwrap();
        let version = state.bump_version();
        doc.insert("_version_".to_string(), json!(version));
        state.docs.push(doc);
    }

    pub fn doc(&self, id: &str) -> Option<Map<String, Value>> {
        self.state.lock().unwrap().find_mut(id).map(|d| d.clone())
    }

    pub fn updates(&self) -> Vec<Value> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn config_requests(&self) -> usize {
        self.state.lock().unwrap().config_requests
    }

    pub fn select_queries(&self) -> Vec<String> {
        self.state.lock().unwrap().select_queries.clone()
    }

    pub fn reject_updates(&self, message: &str) {
        self.state.lock().unwrap().reject_updates = Some(message.to_string());
    }
}

/// Port that had a listener a moment ago and has none now
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Books core: `id` key, a few static fields, three dynamic patterns and
/// one copy rule `title -> text_txt`.
pub fn default_schema() -> Value {
    json!({
        "name": "books",
        "uniqueKey": "id",
        "fields": [
            {"name": "id", "type": "string", "indexed": true, "stored": true, "required": true},
            {"name": "title", "type": "text_general", "indexed": true, "stored": true},
            {"name": "author", "type": "string", "indexed": true, "stored": true},
            {"name": "notes", "type": "string", "indexed": false, "stored": true},
            {"name": "text_txt", "type": "text_general", "indexed": true, "stored": true},
            {"name": "_version_", "type": "plong", "indexed": false, "stored": true}
        ],
        "dynamicFields": [
            {
                "name": "*_ss", "type": "strings",
                "indexed": true, "stored": true, "multiValued": true
            },
            {"name": "*_s", "type": "string", "indexed": true, "stored": true},
            {"name": "*_i", "type": "pint", "indexed": true, "stored": true}
        ],
        "fieldTypes": [
            {"name": "string", "class": "solr.StrField"},
            {"name": "strings", "class": "solr.StrField", "multiValued": true},
            {
                "name": "text_general",
                "class": "solr.TextField",
                "analyzer": {"tokenizer": {"class": "solr.StandardTokenizerFactory"}}
            },
            {"name": "pint", "class": "solr.IntPointField"},
            {"name": "plong", "class": "solr.LongPointField"}
        ],
        "copyFields": [
            {"source": "title", "dest": "text_txt"}
        ]
    })
}

fn solr_error(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(json!({"error": {"msg": msg, "code": status.as_u16()}})),
    )
        .into_response()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn unescape(term: &str) -> String {
    let mut out = String::new();
    let mut chars = term.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn value_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(value_strings).collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => vec![],
        other => vec![other.to_string()],
    }
}

enum Filter {
    All,
    Exact { field: String, value: String },
    Contains { field: String, term: String },
}

fn parse_query(q: &str) -> Option<Filter> {
    if q == "*:*" {
        return Some(Filter::All);
    }
    let (field, rest) = q.split_once(':')?;
    if let Some(quoted) = rest.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        return Some(Filter::Exact {
            field: field.to_string(),
            value: unescape(quoted),
        });
    }
    let inner = rest.strip_prefix('*')?.strip_suffix('*')?;
    Some(Filter::Contains {
        field: field.to_string(),
        term: unescape(inner).to_lowercase(),
    })
}

impl Filter {
    fn matches(&self, doc: &Map<String, Value>) -> bool {
        match self {
            Filter::All => true,
            Filter::Exact { field, value } => doc
                .get(field)
                .is_some_and(|v| value_strings(v).iter().any(|s| s == value)),
            Filter::Contains { field, term } => doc
                .get(field)
                .is_some_and(|v| value_strings(v).iter().any(|s| s.to_lowercase().contains(term))),
        }
    }
}

async fn select(
    State(state): State<SharedState>,
    Path(_core): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut state = state.lock().unwrap();
    let q = param(&params, "q").unwrap_or("*:*").to_string();
    state.select_queries.push(q.clone());

    let Some(filter) = parse_query(&q) else {
        return solr_error(StatusCode::BAD_REQUEST, &format!("cannot parse '{q}'"));
    };

    let rows: usize = param(&params, "rows").and_then(|r| r.parse().ok()).unwrap_or(10);
    let start: usize = param(&params, "start").and_then(|s| s.parse().ok()).unwrap_or(0);

    let matched: Vec<&Map<String, Value>> =
        state.docs.iter().filter(|d| filter.matches(d)).collect();
    let page: Vec<Map<String, Value>> = matched
        .iter()
        .skip(start)
        .take(rows)
        .map(|d| (*d).clone())
        .collect();

    let mut body = json!({
        "responseHeader": {"status": 0},
        "response": {"numFound": matched.len(), "start": start, "docs": page}
    });

    if param(&params, "hl") == Some("true") {
        let pre = param(&params, "hl.simple.pre").unwrap_or("<em>");
        let post = param(&params, "hl.simple.post").unwrap_or("</em>");
        let mut highlighting = Map::new();
        if let Filter::Contains { field, .. } = &filter {
            for doc in &page {
                let id = doc
                    .get(&state.unique_key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let snippets: Vec<String> = doc
                    .get(field)
                    .map(value_strings)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|s| format!("{pre}{s}{post}"))
                    .collect();
                let mut per_field = Map::new();
                per_field.insert(field.clone(), json!(snippets));
                highlighting.insert(id, Value::Object(per_field));
            }
        }
        body["highlighting"] = Value::Object(highlighting);
    }

    Json(body).into_response()
}

async fn schema_handler(State(state): State<SharedState>, Path(_core): Path<String>) -> Response {
    let state = state.lock().unwrap();
    Json(json!({"responseHeader": {"status": 0}, "schema": state.schema})).into_response()
}

async fn config_handler(State(state): State<SharedState>, Path(_core): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    state.config_requests += 1;

    let config = match state.config_mode {
        ConfigMode::Nested => json!({
            "updateHandler": {"class": "solr.DirectUpdateHandler2", "updateLog": {"dir": "tlog"}}
        }),
        ConfigMode::Flat => json!({"updateHandlerupdateLog": {"dir": "tlog"}}),
        ConfigMode::Disabled => json!({"updateHandler": {"class": "solr.DirectUpdateHandler2"}}),
        ConfigMode::Error => {
            return solr_error(StatusCode::INTERNAL_SERVER_ERROR, "config handler unavailable");
        }
    };
    Json(json!({"responseHeader": {"status": 0}, "config": config})).into_response()
}

fn is_atomic(doc: &Map<String, Value>) -> bool {
    doc.values()
        .any(|v| v.as_object().is_some_and(|o| o.contains_key("set")))
}

async fn update(
    State(state): State<SharedState>,
    Path(_core): Path<String>,
    Json(docs): Json<Vec<Value>>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.updates.push(Value::Array(docs.clone()));

    if let Some(msg) = state.reject_updates.clone() {
        return solr_error(StatusCode::BAD_REQUEST, &msg);
    }

    let key = state.unique_key.clone();
    for doc in docs {
        let Some(doc) = doc.as_object().cloned() else {
            return solr_error(StatusCode::BAD_REQUEST, "document must be an object");
        };
        let Some(id) = doc.get(&key).and_then(Value::as_str).map(str::to_string) else {
            return solr_error(StatusCode::BAD_REQUEST, "missing unique key");
        };
        let version = state.bump_version();

        if is_atomic(&doc) {
            let Some(existing) = state.find_mut(&id) else {
                return solr_error(StatusCode::BAD_REQUEST, "atomic update on missing document");
            };
            for (field, op) in doc {
                if let Some(value) = op.get("set") {
                    if value.is_null() {
                        existing.remove(&field);
                    } else {
                        existing.insert(field, value.clone());
                    }
                }
            }
            existing.insert("_version_".to_string(), json!(version));
            continue;
        }

        if let Some(expected) = doc.get("_version_").and_then(Value::as_u64) {
            let current = state
                .find_mut(&id)
                .and_then(|d| d.get("_version_").and_then(Value::as_u64));
            if current != Some(expected) {
                return solr_error(StatusCode::CONFLICT, "version conflict");
            }
        }

        let mut doc = doc;
        doc.insert("_version_".to_string(), json!(version));
        match state.find_mut(&id) {
            Some(existing) => *existing = doc,
            None => state.docs.push(doc),
        }
    }

    Json(json!({"responseHeader": {"status": 0}})).into_response()
}
