use serde::{Deserialize, Serialize};
use crate::core::Game;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// List envelope returned by `resolve_list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamePage {
    /// Total matching records (or the provider's count for title searches)
    pub count: u64,

    pub results: Vec<Game>,

    /// Link/token to the next page
    pub next: Option<String>,

    /// Link/token to the previous page
    pub previous: Option<String>,
}

impl GamePage {
    pub fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
            next: None,
            previous: None,
        }
    }
}

/// Filters accepted by `resolve_list`.
///
/// `page` and `limit` are kept raw; they are coerced by [`PageRequest::from_raw`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilters {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl ListFilters {
    /// Title filter, ignoring blank values
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Platform filter, ignoring blank values
    pub fn platform(&self) -> Option<&str> {
        non_blank(self.platform.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a positive integer, falling back to `default` for anything else
pub fn parse_positive(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(default)
}

/// Validated page/limit pair for store-backed listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page, DEFAULT_PAGE),
            limit: parse_positive(limit, DEFAULT_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.limit)
    }

    pub fn take(&self) -> u64 {
        u64::from(self.limit)
    }

    /// Whether records remain beyond this page
    pub fn has_next(&self, total: u64) -> bool {
        self.skip() + self.take() < total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Build a page link: `{base}?page=N&limit=L[&platform=P]`
    pub fn link(&self, base: &str, page: u32, platform: Option<&str>) -> String {
        let mut link = format!("{}?page={}&limit={}", base, page, self.limit);
        if let Some(platform) = platform {
            link.push_str("&platform=");
            link.push_str(&urlencoding::encode(platform));
        }
        link
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_defaults() {
        assert_eq!(parse_positive(None, 10), 10);
        assert_eq!(parse_positive(Some("abc"), 10), 10);
        assert_eq!(parse_positive(Some("0"), 10), 10);
        assert_eq!(parse_positive(Some("-3"), 10), 10);
        assert_eq!(parse_positive(Some("2.5"), 10), 10);
        assert_eq!(parse_positive(Some(" 7 "), 10), 7);
        assert_eq!(parse_positive(Some("99999999999"), 10), 10);
    }

    #[test]
    fn test_skip_and_take() {
        let req = PageRequest::from_raw(Some("3"), Some("20"));
        assert_eq!(req.skip(), 40);
        assert_eq!(req.take(), 20);
    }

    #[test]
    fn test_next_and_previous() {
        let first = PageRequest::from_raw(Some("1"), Some("10"));
        assert!(first.has_next(15));
        assert!(!first.has_previous());

        let second = PageRequest::from_raw(Some("2"), Some("10"));
        assert!(!second.has_next(15));
        assert!(second.has_previous());

        // Exactly filled page has no next
        assert!(!first.has_next(10));
    }

    #[test]
    fn test_link_encodes_platform() {
        let req = PageRequest::from_raw(Some("2"), Some("5"));
        assert_eq!(req.link("/games", 3, None), "/games?page=3&limit=5");
        assert_eq!(
            req.link("/games", 1, Some("Xbox Series S/X")),
            "/games?page=1&limit=5&platform=Xbox%20Series%20S%2FX"
        );
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let filters = ListFilters {
            title: Some("   ".into()),
            platform: Some(" PC ".into()),
            ..Default::default()
        };
        assert_eq!(filters.title(), None);
        assert_eq!(filters.platform(), Some("PC"));
    }
}
