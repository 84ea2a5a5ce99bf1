//! Keyset pagination parameters
//!
//! Every listing takes `limit`, `since` and `desc` query parameters; post
//! listings also take a `sort` mode. Cursors are always the sort key of the
//! last item seen, never an offset.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;

use crate::error::{AppError, Result};

/// Page size used when `limit` is absent or unusable
pub const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Only the literal `true` selects descending order
    pub fn from_desc_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("true") => Direction::Desc,
            _ => Direction::Asc,
        }
    }

    pub fn is_desc(self) -> bool {
        self == Direction::Desc
    }

    /// Orient an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// Traversal mode for thread post listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostSort {
    /// By post id
    #[default]
    Flat,
    /// By path vector: depth-first, parents before children
    Tree,
    /// Like tree, but pages count root posts and always include whole subtrees
    ParentTree,
}

impl PostSort {
    pub fn from_param(sort: Option<&str>) -> Self {
        match sort {
            Some("tree") => PostSort::Tree,
            Some("parent_tree") => PostSort::ParentTree,
            _ => PostSort::Flat,
        }
    }
}

/// A bounded, ordered request for a slice of a sequence keyed by `C`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<C> {
    pub limit: i64,
    /// Boundary key; `None` starts from the beginning
    pub since: Option<C>,
    pub direction: Direction,
}

impl<C> Page<C> {
    pub fn new(limit: i64, since: Option<C>, direction: Direction) -> Self {
        Self { limit, since, direction }
    }

    /// First page in ascending order
    pub fn first(limit: i64) -> Self {
        Self::new(limit, None, Direction::Asc)
    }
}

/// Forum threads, keyed by creation time (inclusive boundary)
pub type ThreadPage = Page<DateTime<Utc>>;

/// Forum users, keyed by nickname (exclusive boundary)
pub type UserPage = Page<String>;

/// Named sort specification for post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub mode: PostSort,
    pub direction: Direction,
}

/// Thread posts, keyed by post id (the boundary post is excluded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    pub sort: PostSort,
    pub limit: i64,
    pub since: Option<i64>,
    pub direction: Direction,
}

impl PostPage {
    pub fn new(sort: PostSort, limit: i64, since: Option<i64>, direction: Direction) -> Self {
        Self { sort, limit, since, direction }
    }

    pub fn spec(&self) -> SortSpec {
        SortSpec {
            mode: self.sort,
            direction: self.direction,
        }
    }

    /// Same request continued after `post_id`
    pub fn after(&self, post_id: i64) -> Self {
        Self {
            since: Some(post_id),
            ..self.clone()
        }
    }
}

/// Raw listing query parameters, as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub since: Option<String>,
    pub desc: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    /// Non-numeric or non-positive limits fall back to `default`
    pub fn limit(&self, default: i64) -> i64 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(default)
    }

    pub fn direction(&self) -> Direction {
        Direction::from_desc_flag(self.desc.as_deref())
    }

    fn since(&self) -> Option<&str> {
        self.since.as_deref().filter(|s| !s.is_empty())
    }

    pub fn user_page(&self, default_limit: i64) -> UserPage {
        Page::new(
            self.limit(default_limit),
            self.since().map(str::to_string),
            self.direction(),
        )
    }

    pub fn thread_page(&self, default_limit: i64) -> Result<ThreadPage> {
        let since = self
            .since()
            .map(|s| {
                // A '+' offset arrives as a space once the query string is decoded
                DateTime::parse_from_rfc3339(&s.replace(' ', "+"))
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|_| AppError::BadRequest(format!("Invalid since timestamp '{}'", s)))
            })
            .transpose()?;
        Ok(Page::new(self.limit(default_limit), since, self.direction()))
    }

    pub fn post_page(&self, default_limit: i64) -> Result<PostPage> {
        let since = self
            .since()
            .map(|s| {
                s.parse::<i64>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid since post id '{}'", s)))
            })
            .transpose()?;
        Ok(PostPage::new(
            PostSort::from_param(self.sort.as_deref()),
            self.limit(default_limit),
            since,
            self.direction(),
        ))
    }
}
