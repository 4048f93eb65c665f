//! Graph filters and their URL query representation.
//!
//! A filter survives page reloads by living in the query string. Defaults
//! are left out so shared links stay short, and a filter that would produce
//! an oversized query is compressed by priority.

use crate::{Error, Result, TaskRecord};
use orchay_task_graph::FocusDepth;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Focus depth used when none is given.
pub const DEFAULT_FOCUS_DEPTH: usize = 2;

/// Smallest focus depth a query string may request.
pub const MIN_FOCUS_DEPTH: usize = 1;

/// Largest focus depth a query string may request.
pub const MAX_FOCUS_DEPTH: usize = 3;

/// Longest query string emitted before compression kicks in.
pub const MAX_QUERY_LEN: usize = 2000;

/// Category and status entries kept by a compressed query.
const COMPRESSED_LIST_LIMIT: usize = 3;

/// How tasks are grouped in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyMode {
    /// Every task on its own, laid out by dependency level.
    #[default]
    Full,
    /// Tasks grouped by work package.
    Wp,
    /// Tasks grouped by activity.
    Act,
}

impl HierarchyMode {
    /// Query string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Wp => "wp",
            Self::Act => "act",
        }
    }
}

impl fmt::Display for HierarchyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HierarchyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(Self::Full),
            "wp" => Ok(Self::Wp),
            "act" => Ok(Self::Act),
            other => Err(Error::invalid_hierarchy_mode(other)),
        }
    }
}

/// Which tasks the graph shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphFilter {
    /// Categories to keep; empty keeps all.
    pub categories: Vec<String>,
    /// Bracketed status codes to keep; empty keeps all.
    pub statuses: Vec<String>,
    /// Grouping mode.
    pub hierarchy_mode: HierarchyMode,
    /// Task to centre a focus view on.
    pub focus_task: Option<String>,
    /// Hop bound for the focus view.
    pub focus_depth: usize,
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            statuses: Vec::new(),
            hierarchy_mode: HierarchyMode::Full,
            focus_task: None,
            focus_depth: DEFAULT_FOCUS_DEPTH,
        }
    }
}

impl GraphFilter {
    /// Centre the filter on `task` with a depth from loosely typed input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Graph`] when `depth` is negative.
    pub fn with_focus(mut self, task: impl Into<String>, depth: i64) -> Result<Self> {
        self.focus_depth = FocusDepth::try_from(depth)?.get();
        self.focus_task = Some(task.into());
        Ok(self)
    }

    /// Whether `task` passes the category and status filters.
    #[must_use]
    pub fn matches(&self, task: &TaskRecord) -> bool {
        let category_ok = self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c == task.category_or_default());
        let status_ok =
            self.statuses.is_empty() || self.statuses.iter().any(|s| s == task.status_code());
        category_ok && status_ok
    }

    /// Serialize to a URL query string (without the leading `?`).
    ///
    /// Falls back to [`Self::encode_compressed_query`] when the full form
    /// would exceed [`MAX_QUERY_LEN`].
    #[must_use]
    pub fn encode_query(&self) -> String {
        let mut params = QueryBuilder::default();

        if !self.categories.is_empty() {
            params.push("categories", &self.categories.join(","));
        }
        if !self.statuses.is_empty() {
            params.push("statuses", &strip_brackets(&self.statuses).join(","));
        }
        if self.hierarchy_mode != HierarchyMode::Full {
            params.push("hierarchyMode", self.hierarchy_mode.as_str());
        }
        self.push_focus(&mut params);

        let query = params.finish();
        if query.len() > MAX_QUERY_LEN {
            warn!(
                length = query.len(),
                limit = MAX_QUERY_LEN,
                "Filter query too long, compressing"
            );
            return self.encode_compressed_query();
        }
        query
    }

    /// Serialize by priority: focus, hierarchy mode, then at most three
    /// categories and three statuses.
    #[must_use]
    pub fn encode_compressed_query(&self) -> String {
        let mut params = QueryBuilder::default();

        self.push_focus(&mut params);
        if self.hierarchy_mode != HierarchyMode::Full {
            params.push("hierarchyMode", self.hierarchy_mode.as_str());
        }
        if !self.categories.is_empty() {
            let limited: Vec<&str> = self
                .categories
                .iter()
                .take(COMPRESSED_LIST_LIMIT)
                .map(String::as_str)
                .collect();
            params.push("categories", &limited.join(","));
        }
        if !self.statuses.is_empty() {
            let limited = strip_brackets(&self.statuses[..self.statuses.len().min(COMPRESSED_LIST_LIMIT)]);
            params.push("statuses", &limited.join(","));
        }

        params.finish()
    }

    fn push_focus(&self, params: &mut QueryBuilder) {
        if let Some(focus) = self.focus_task.as_deref().filter(|f| !f.is_empty()) {
            params.push("focusTask", focus);
            if self.focus_depth != DEFAULT_FOCUS_DEPTH {
                params.push("focusDepth", &self.focus_depth.to_string());
            }
        }
    }

    /// Restore a filter from a URL query string.
    ///
    /// Never fails: unknown hierarchy modes fall back to `full`, a missing or
    /// unparsable depth falls back to the default, and any parsed depth is
    /// clamped to `1..=3`.
    #[must_use]
    pub fn parse_query(query: &str) -> Self {
        let params = parse_pairs(query);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let categories = get("categories").map(split_list).unwrap_or_default();
        let statuses: Vec<String> = get("statuses")
            .map(|s| split_list(s).into_iter().map(|code| format!("[{code}]")).collect())
            .unwrap_or_default();
        let hierarchy_mode = get("hierarchyMode")
            .and_then(|m| m.parse().ok())
            .unwrap_or_default();
        let focus_task = get("focusTask")
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        let focus_depth = match get("focusDepth").filter(|d| !d.is_empty()) {
            None => DEFAULT_FOCUS_DEPTH,
            Some(raw) => parse_int_prefix(raw).map_or(DEFAULT_FOCUS_DEPTH, clamp_depth),
        };

        Self {
            categories,
            statuses,
            hierarchy_mode,
            focus_task,
            focus_depth,
        }
    }
}

fn strip_brackets(statuses: &[String]) -> Vec<String> {
    statuses
        .iter()
        .map(|s| s.chars().filter(|c| *c != '[' && *c != ']').collect())
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn clamp_depth(depth: i64) -> usize {
    usize::try_from(depth)
        .unwrap_or(0)
        .clamp(MIN_FOCUS_DEPTH, MAX_FOCUS_DEPTH)
}

/// Parse a leading decimal integer the way a lenient form field would:
/// leading whitespace and a sign are accepted, trailing junk is ignored.
fn parse_int_prefix(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate instead of failing on absurdly long inputs; the caller clamps.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Accumulates `key=value` pairs in form encoding.
#[derive(Default)]
struct QueryBuilder {
    query: String,
}

impl QueryBuilder {
    fn push(&mut self, key: &str, value: &str) {
        if !self.query.is_empty() {
            self.query.push('&');
        }
        form_encode_into(&mut self.query, key);
        self.query.push('=');
        form_encode_into(&mut self.query, value);
    }

    fn finish(self) -> String {
        self.query
    }
}

fn form_encode_into(out: &mut String, value: &str) {
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            other => {
                out.push('%');
                out.push_str(&format!("{other:02X}"));
            }
        }
    }
}

fn form_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
                i += 2;
            }
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

fn parse_pairs(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (form_decode(key), form_decode(value))
        })
        .collect()
}
