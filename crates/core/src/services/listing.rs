//! Listing parameters: sort keys and page numbers.
//!
//! Raw query-string values come in as text and are normalized here, so bad
//! input degrades to defaults instead of failing the request.

use std::fmt;

use notebook_db::entities::note;
use sea_orm::Order;
use serde::Deserialize;

/// Notes per listing page.
pub const PAGE_SIZE: u64 = 12;

/// Sortable note fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    UpdatedAt,
    CreatedAt,
    Title,
    Views,
}

impl SortField {
    const fn name(self) -> &'static str {
        match self {
            Self::UpdatedAt => "updated_at",
            Self::CreatedAt => "created_at",
            Self::Title => "title",
            Self::Views => "views",
        }
    }

    const fn column(self) -> note::Column {
        match self {
            Self::UpdatedAt => note::Column::UpdatedAt,
            Self::CreatedAt => note::Column::CreatedAt,
            Self::Title => note::Column::Title,
            Self::Views => note::Column::Views,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "updated_at" => Some(Self::UpdatedAt),
            "created_at" => Some(Self::CreatedAt),
            "title" => Some(Self::Title),
            "views" => Some(Self::Views),
            _ => None,
        }
    }
}

/// A sort field plus direction, written `field` or `-field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            field: SortField::UpdatedAt,
            descending: true,
        }
    }
}

impl SortKey {
    /// Parse a sort key. Unknown keys fall back to `-updated_at`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        SortField::from_name(name).map_or_else(Self::default, |field| Self { field, descending })
    }

    /// Column to order by.
    #[must_use]
    pub const fn column(&self) -> note::Column {
        self.field.column()
    }

    /// Direction to order in.
    #[must_use]
    pub const fn order(&self) -> Order {
        if self.descending { Order::Desc } else { Order::Asc }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(self.field.name())
    }
}

/// Parse a 1-based page number. Missing, unparseable and non-positive
/// values give page 1; the upper bound is clamped once the total is known.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map_or(1, |p| p as u64)
}

/// Query-string parameters of the note listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Substring searched in title and content.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact tag name.
    #[serde(default)]
    pub tag: Option<String>,
    /// Any non-empty value other than `false`/`0` enables the filter.
    #[serde(default)]
    pub favorites: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl ListQuery {
    /// Whether the favorites-only filter is on.
    #[must_use]
    pub fn favorites_only(&self) -> bool {
        self.favorites
            .as_deref()
            .map(str::trim)
            .is_some_and(|v| !v.is_empty() && v != "false" && v != "0")
    }

    /// Effective sort key.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        self.sort.as_deref().map_or_else(SortKey::default, SortKey::parse)
    }

    /// Requested page, before clamping to the last page.
    #[must_use]
    pub fn page(&self) -> u64 {
        parse_page(self.page.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort() {
        let key = SortKey::default();
        assert_eq!(key.field, SortField::UpdatedAt);
        assert!(key.descending);
        assert_eq!(key.to_string(), "-updated_at");
    }

    #[test]
    fn test_parse_ascending() {
        let key = SortKey::parse("title");
        assert_eq!(key.field, SortField::Title);
        assert!(!key.descending);
        assert_eq!(key.order(), Order::Asc);
    }

    #[test]
    fn test_parse_descending() {
        let key = SortKey::parse("-views");
        assert_eq!(key.field, SortField::Views);
        assert_eq!(key.order(), Order::Desc);
        assert_eq!(key.to_string(), "-views");
    }

    #[test]
    fn test_unknown_key_falls_back() {
        assert_eq!(SortKey::parse("bogus"), SortKey::default());
        assert_eq!(SortKey::parse("-password"), SortKey::default());
        assert_eq!(SortKey::parse(""), SortKey::default());
        assert_eq!(SortKey::parse("--title"), SortKey::default());
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some(" 2 ")), 2);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-4")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("")), 1);
    }

    #[test]
    fn test_favorites_flag() {
        let mut query = ListQuery::default();
        assert!(!query.favorites_only());

        query.favorites = Some("1".to_string());
        assert!(query.favorites_only());

        query.favorites = Some("true".to_string());
        assert!(query.favorites_only());

        query.favorites = Some("false".to_string());
        assert!(!query.favorites_only());

        query.favorites = Some(String::new());
        assert!(!query.favorites_only());
    }

    #[test]
    fn test_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.sort_key(), SortKey::default());
        assert_eq!(query.page(), 1);
    }
}
