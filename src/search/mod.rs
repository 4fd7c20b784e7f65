mod query;

pub(crate) use query::SelectResponse;
pub use query::{
    DEFAULT_ROWS, Highlighting, MATCH_ALL, SearchRequest, SearchResults, build_query,
    escape_wildcard_term, highlight_params, id_query,
};
