use crate::core::{Result, SolrError};
use regex::Regex;

/// Compiled glob used to match concrete field names against a dynamic
/// field declaration such as `*_txt` or `attr_*`.
///
/// Semantics follow shell `fnmatch`: `*` matches any run, `?` one char,
/// `[abc]` / `[!abc]` a character class. Matching is case-sensitive.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Regex(Regex),
}

impl GlobPattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let matcher = match fast_path(pattern) {
            Some(m) => m,
            None => {
                let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| {
                    SolrError::InvalidSchema(format!(
                        "Invalid dynamic field pattern '{}': {}",
                        pattern, e
                    ))
                })?;
                Matcher::Regex(regex)
            }
        };

        Ok(Self {
            source: pattern.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::Exact(s) => name == s,
            Matcher::Prefix(p) => name.starts_with(p.as_str()),
            Matcher::Suffix(s) => name.ends_with(s.as_str()),
            Matcher::Contains(s) => name.contains(s.as_str()),
            Matcher::Regex(re) => re.is_match(name),
        }
    }
}

fn has_wildcards(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Shapes that need no regex. Solr itself only allows a leading or
/// trailing `*`, so nearly every real schema lands here.
fn fast_path(pattern: &str) -> Option<Matcher> {
    // 1. No wildcards at all
    if !has_wildcards(pattern) {
        return Some(Matcher::Exact(pattern.to_string()));
    }

    // 2. "*infix*"
    if pattern.len() >= 2 && pattern.starts_with('*') && pattern.ends_with('*') {
        let inner = &pattern[1..pattern.len() - 1];
        if !has_wildcards(inner) {
            return Some(Matcher::Contains(inner.to_string()));
        }
    }

    // 3. "prefix*"
    if let Some(prefix) = pattern.strip_suffix('*') {
        if !has_wildcards(prefix) {
            return Some(Matcher::Prefix(prefix.to_string()));
        }
    }

    // 4. "*suffix"
    if let Some(suffix) = pattern.strip_prefix('*') {
        if !has_wildcards(suffix) {
            return Some(Matcher::Suffix(suffix.to_string()));
        }
    }

    None
}

fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    regex.push('[');
                    let mut j = i + 1;
                    if chars[j] == '!' {
                        regex.push('^');
                        j += 1;
                    }
                    while j < end {
                        let c = chars[j];
                        if c == '\\' || c == '[' || c == '^' || c == '&' || c == '~' {
                            regex.push('\\');
                        }
                        regex.push(c);
                        j += 1;
                    }
                    regex.push(']');
                    i = end;
                }
                None => regex.push_str("\\["),
            },
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    regex.push('$');
    regex
}

/// Index of the `]` closing the class opened at `start`, if any.
/// A `]` directly after `[` or `[!` is a literal member.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}
