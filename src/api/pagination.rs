//! Page-number pagination for the list endpoints

use serde::{Deserialize, Serialize};

use crate::{GeoApiError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// 1-based page number, defaults to the first page. Kept as text so a
    /// malformed value gets the same answer as an out-of-range one.
    pub page: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Page<T> {
    /// Total number of records across all pages
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Cuts the requested page out of `items`. `path` is used to build the
/// `next`/`previous` links.
pub fn paginate<T>(items: Vec<T>, params: &PageParams, page_size: usize, path: &str) -> Result<Page<T>> {
    let count = items.len();
    let page_size = page_size.max(1);
    let last_page = count.div_ceil(page_size).max(1);
    let page = match params.page.as_deref() {
        None => 1,
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| GeoApiError::not_found("Invalid page."))?,
    };

    if page == 0 || page > last_page {
        return Err(GeoApiError::not_found("Invalid page."));
    }

    let results = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Ok(Page {
        count,
        next: (page < last_page).then(|| format!("{path}?page={}", page + 1)),
        previous: (page > 1).then(|| format!("{path}?page={}", page - 1)),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, vec![1, 2], None, Some("/api/cities?page=2"))]
    #[case(Some("2"), vec![3, 4], Some("/api/cities?page=1"), Some("/api/cities?page=3"))]
    #[case(Some("3"), vec![5], Some("/api/cities?page=2"), None)]
    fn test_pages(
        #[case] page: Option<&str>,
        #[case] expected: Vec<u32>,
        #[case] previous: Option<&str>,
        #[case] next: Option<&str>,
    ) {
        let params = PageParams {
            page: page.map(str::to_string),
        };
        let page = paginate(vec![1, 2, 3, 4, 5], &params, 2, "/api/cities").unwrap();
        assert_eq!(page.count, 5);
        assert_eq!(page.results, expected);
        assert_eq!(page.previous.as_deref(), previous);
        assert_eq!(page.next.as_deref(), next);
    }

    #[rstest]
    #[case("0")]
    #[case("4")]
    #[case("abc")]
    #[case("last")]
    #[case("-1")]
    #[case("")]
    fn test_invalid_page_is_not_found(#[case] page: &str) {
        let params = PageParams {
            page: Some(page.to_string()),
        };
        let result = paginate(vec![1, 2, 3, 4, 5], &params, 2, "/x");
        assert!(
            matches!(result, Err(GeoApiError::NotFound { ref message }) if message == "Invalid page.")
        );
    }

    #[test]
    fn test_single_page() {
        let page = paginate(vec!["a"], &PageParams::default(), 20, "/x").unwrap();
        assert_eq!(page.results, vec!["a"]);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }
}
