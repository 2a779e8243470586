//! Catalog listing parameters and pagination.
//!
//! [`CatalogQuery`] turns untrusted query-string values into a normalized,
//! whitelisted description of a product listing. Only whitelisted column
//! names ever reach SQL through [`SortField::column`].

use serde::{Deserialize, Serialize};

/// Default page size for the catalog.
pub const DEFAULT_LIMIT: u32 = 9;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// Column the catalog can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Price,
    Name,
    Id,
}

impl SortField {
    /// Parse a sort key, accepting the `p.`-prefixed aliases old links use.
    ///
    /// Unknown keys fall back to [`SortField::Price`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().trim_start_matches("p.") {
            "name" => Self::Name,
            "id" => Self::Id,
            _ => Self::Price,
        }
    }

    /// Column expression for `ORDER BY`.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Price => "p.price",
            Self::Name => "p.name",
            Self::Id => "p.id",
        }
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Name => "name",
            Self::Id => "id",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse case-insensitively; anything but `desc` is ascending.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// SQL keyword.
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Raw catalog parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// Normalized catalog listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
    pub limit: u32,
    pub page: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            sort: SortField::default(),
            direction: SortDirection::default(),
            limit: DEFAULT_LIMIT,
            page: 1,
        }
    }
}

impl From<CatalogParams> for CatalogQuery {
    fn from(params: CatalogParams) -> Self {
        let limit = params
            .limit
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map_or(DEFAULT_LIMIT, |v| v.clamp(1, MAX_LIMIT));
        let page = params
            .page
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map_or(1, |v| v.max(1));

        Self {
            search: non_blank(params.q),
            category: non_blank(params.category),
            sort: params
                .sort
                .as_deref()
                .map_or_else(SortField::default, SortField::parse_lenient),
            direction: params
                .direction
                .as_deref()
                .map_or_else(SortDirection::default, SortDirection::parse_lenient),
            limit,
            page,
        }
    }
}

impl CatalogQuery {
    /// Row offset of the current page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    /// `LIKE` pattern for the search term, if any.
    #[must_use]
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }

    /// Query string reproducing this listing at another page.
    ///
    /// Values are percent-encoded by the caller-supplied `encode` so this
    /// crate stays free of URL dependencies.
    #[must_use]
    pub fn query_string_for_page(&self, page: u32, encode: impl Fn(&str) -> String) -> String {
        let mut parts = Vec::with_capacity(6);
        if let Some(q) = &self.search {
            parts.push(format!("q={}", encode(q)));
        }
        if let Some(category) = &self.category {
            parts.push(format!("category={}", encode(category)));
        }
        parts.push(format!("sort={}", self.sort.as_str()));
        parts.push(format!("direction={}", self.direction.as_str()));
        parts.push(format!("limit={}", self.limit));
        parts.push(format!("page={page}"));
        parts.join("&")
    }
}

/// `%term%` with `LIKE` metacharacters escaped (backslash is the escape).
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// One page of results plus what the pager needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Build a page from a slice of results and the unpaginated count.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let total_pages = u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page: page.max(1),
            per_page,
            total_pages,
        }
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page numbers for the pager.
    #[must_use]
    pub fn pages(&self) -> Vec<u32> {
        (1..=self.total_pages).collect()
    }

    /// Transform the items, keeping the pagination.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> CatalogParams {
        let mut p = CatalogParams::default();
        for (k, v) in pairs {
            let v = Some((*v).to_owned());
            match *k {
                "q" => p.q = v,
                "category" => p.category = v,
                "sort" => p.sort = v,
                "direction" => p.direction = v,
                "limit" => p.limit = v,
                "page" => p.page = v,
                _ => unreachable!(),
            }
        }
        p
    }

    #[test]
    fn test_defaults() {
        let q = CatalogQuery::from(CatalogParams::default());
        assert_eq!(q, CatalogQuery::default());
        assert_eq!(q.limit, 9);
        assert_eq!(q.sort.column(), "p.price");
        assert_eq!(q.direction.sql(), "ASC");
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_sort_whitelist() {
        let q = CatalogQuery::from(params(&[("sort", "p.name"), ("direction", "DESC")]));
        assert_eq!(q.sort, SortField::Name);
        assert_eq!(q.direction, SortDirection::Desc);

        let q = CatalogQuery::from(params(&[("sort", "p.price; DROP TABLE product"), ("direction", "sideways")]));
        assert_eq!(q.sort, SortField::Price);
        assert_eq!(q.direction, SortDirection::Asc);
    }

    #[test]
    fn test_limit_and_page_are_clamped() {
        let q = CatalogQuery::from(params(&[("limit", "0"), ("page", "0")]));
        assert_eq!((q.limit, q.page), (1, 1));
        let q = CatalogQuery::from(params(&[("limit", "5000"), ("page", "3")]));
        assert_eq!((q.limit, q.page), (100, 3));
        assert_eq!(q.offset(), 200);
        let q = CatalogQuery::from(params(&[("limit", "nine")]));
        assert_eq!(q.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_blank_filters_are_absent() {
        let q = CatalogQuery::from(params(&[("q", "   "), ("category", "")]));
        assert_eq!(q.search, None);
        assert_eq!(q.category, None);
        assert_eq!(q.like_pattern(), None);
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern(" casque "), "%casque%");
        assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
    }

    #[test]
    fn test_query_string_for_page() {
        let q = CatalogQuery::from(params(&[("q", "tapis yoga"), ("sort", "name")]));
        let qs = q.query_string_for_page(2, |s| s.replace(' ', "%20"));
        assert_eq!(qs, "q=tapis%20yoga&sort=name&direction=asc&limit=9&page=2");
    }

    #[test]
    fn test_page_math() {
        let page = Page::new(vec![1, 2, 3], 20, 2, 9);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.pages(), vec![1, 2, 3]);

        let empty: Page<i32> = Page::new(vec![], 0, 1, 9);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }

    #[test]
    fn test_page_map_keeps_counts() {
        let page = Page::new(vec![1, 2], 2, 1, 9).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 2);
    }
}
