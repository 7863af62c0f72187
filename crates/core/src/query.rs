#![forbid(unsafe_code)]

//! Listing parameters for issues and comments.
//!
//! Parsing is deliberately forgiving: a malformed optional value behaves as if
//! it had not been supplied, so a list request never fails on its filters.

use crate::ids::{IssueId, PriorityId, StatusId, TagId, UserId};
use crate::timestamp::{DayEdge, parse_timestamp_ms};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_ISSUE_LIMIT: u64 = 5;
pub const DEFAULT_COMMENT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Raw string parameters as decoded by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Looks up a camelCase key, falling back to its snake_case spelling.
    fn lookup(&self, camel: &str, snake: &str) -> Option<&str> {
        self.get(camel).or_else(|| self.get(snake))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn parse(params: &QueryParams, default_limit: u64) -> Self {
        Self {
            skip: parse_skip(params.get("skip")),
            limit: parse_limit(params.get("limit"), default_limit),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub status_id: Option<StatusId>,
    pub priority_id: Option<PriorityId>,
    pub author_id: Option<UserId>,
    pub assignee_id: Option<UserId>,
    /// Matches issues carrying any of these tags. Empty means no tag filter.
    pub tag_ids: BTreeSet<TagId>,
    pub created_after_ms: Option<i64>,
    pub created_before_ms: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueQuery {
    pub filter: IssueFilter,
    pub page: PageRequest,
}

impl IssueQuery {
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            filter: IssueFilter {
                status_id: parse_id(params.lookup("statusId", "status_id")),
                priority_id: parse_id(params.lookup("priorityId", "priority_id")),
                author_id: parse_id(params.lookup("authorId", "author_id")),
                assignee_id: parse_id(params.lookup("assigneeId", "assignee_id")),
                tag_ids: parse_id_set(params.lookup("tagIds", "tag_ids")),
                created_after_ms: parse_bound(
                    params.lookup("createdAfter", "created_after"),
                    DayEdge::Start,
                ),
                created_before_ms: parse_bound(
                    params.lookup("createdBefore", "created_before"),
                    DayEdge::End,
                ),
            },
            page: PageRequest::parse(params, DEFAULT_ISSUE_LIMIT),
        }
    }
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self::from_params(&QueryParams::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub issue_id: Option<IssueId>,
    pub author_id: Option<UserId>,
    /// Case-insensitive substring of the author's name.
    pub author_name: Option<String>,
    pub created_after_ms: Option<i64>,
    pub created_before_ms: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentQuery {
    pub filter: CommentFilter,
    pub page: PageRequest,
}

impl CommentQuery {
    pub fn from_params(params: &QueryParams) -> Self {
        let author_name = params
            .lookup("authorName", "author_name")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Self {
            filter: CommentFilter {
                issue_id: parse_id(params.lookup("issueId", "issue_id")),
                author_id: parse_id(params.lookup("authorId", "author_id")),
                author_name,
                created_after_ms: parse_bound(
                    params.lookup("createdAfter", "created_after"),
                    DayEdge::Start,
                ),
                created_before_ms: parse_bound(
                    params.lookup("createdBefore", "created_before"),
                    DayEdge::End,
                ),
            },
            page: PageRequest::parse(params, DEFAULT_COMMENT_LIMIT),
        }
    }
}

impl Default for CommentQuery {
    fn default() -> Self {
        Self::from_params(&QueryParams::new())
    }
}

pub fn parse_skip(value: Option<&str>) -> u64 {
    value
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map(|skip| skip.max(0) as u64)
        .unwrap_or(0)
}

pub fn parse_limit(value: Option<&str>, default_limit: u64) -> u64 {
    match value.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        Some(limit) if limit > 0 => (limit as u64).min(MAX_LIMIT),
        _ => default_limit,
    }
}

pub fn parse_id(value: Option<&str>) -> Option<i64> {
    value.and_then(|raw| raw.trim().parse::<i64>().ok())
}

/// Comma-separated ids; entries that are not integers are dropped.
pub fn parse_id_set(value: Option<&str>) -> BTreeSet<i64> {
    let Some(raw) = value else {
        return BTreeSet::new();
    };
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

fn parse_bound(value: Option<&str>, edge: DayEdge) -> Option<i64> {
    value.and_then(|raw| parse_timestamp_ms(raw, edge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 0)]
    #[case(Some("15"), 15)]
    #[case(Some("-3"), 0)]
    #[case(Some("abc"), 0)]
    #[case(Some(" 4 "), 4)]
    fn skip_clamps_and_defaults(#[case] input: Option<&str>, #[case] expected: u64) {
        assert_eq!(parse_skip(input), expected);
    }

    #[rstest]
    #[case(None, 5)]
    #[case(Some("20"), 20)]
    #[case(Some("0"), 5)]
    #[case(Some("-1"), 5)]
    #[case(Some("1.5"), 5)]
    #[case(Some("100000"), MAX_LIMIT)]
    fn limit_falls_back_to_default(#[case] input: Option<&str>, #[case] expected: u64) {
        assert_eq!(parse_limit(input, DEFAULT_ISSUE_LIMIT), expected);
    }

    #[test]
    fn tag_ids_drop_malformed_entries() {
        let ids = parse_id_set(Some("1, 2,x,,3"));
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(parse_id_set(Some("nope")).is_empty());
    }

    #[test]
    fn issue_query_treats_malformed_filters_as_absent() {
        let params: QueryParams = [
            ("statusId", "open"),
            ("priorityId", "2"),
            ("tagIds", "3,4"),
            ("createdAfter", "not-a-date"),
            ("createdBefore", "2025-01-02"),
            ("skip", "-10"),
            ("limit", "zero"),
        ]
        .into_iter()
        .collect();

        let query = IssueQuery::from_params(&params);
        assert_eq!(query.filter.status_id, None);
        assert_eq!(query.filter.priority_id, Some(2));
        assert_eq!(query.filter.tag_ids.len(), 2);
        assert_eq!(query.filter.created_after_ms, None);
        assert!(query.filter.created_before_ms.is_some());
        assert_eq!(
            query.page,
            PageRequest {
                skip: 0,
                limit: DEFAULT_ISSUE_LIMIT
            }
        );
    }

    #[test]
    fn snake_case_keys_are_accepted() {
        let params = QueryParams::new()
            .with("author_id", "9")
            .with("issue_id", "4")
            .with("author_name", "  jan ");
        let comments = CommentQuery::from_params(&params);
        assert_eq!(comments.filter.author_id, Some(9));
        assert_eq!(comments.filter.issue_id, Some(4));
        assert_eq!(comments.filter.author_name.as_deref(), Some("jan"));
        assert_eq!(comments.page.limit, DEFAULT_COMMENT_LIMIT);
    }

    #[test]
    fn camel_case_wins_over_snake_case() {
        let params = QueryParams::new()
            .with("statusId", "1")
            .with("status_id", "2");
        assert_eq!(IssueQuery::from_params(&params).filter.status_id, Some(1));
    }
}
