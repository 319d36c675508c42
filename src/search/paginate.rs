//! Fixed-size pagination of ranked results.

use serde::Serialize;

use crate::error::{LoupeError, Result};

/// One page of a result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    /// Maximum items per page.
    pub page_size: usize,
    /// Items across all pages.
    pub total_items: usize,
    /// Number of non-empty pages.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Whether a later page has items.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Transform the items, keeping the page metadata.
    pub fn try_map<U, F>(self, f: F) -> Result<Page<U>>
    where
        F: FnMut(T) -> Result<U>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<Vec<U>>>()?,
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        })
    }
}

/// Slice page `page` (1-based) out of `items`.
///
/// A page past the end is empty rather than an error.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Result<Page<T>> {
    if page == 0 {
        return Err(LoupeError::invalid_argument("page numbers start at 1"));
    }
    if page_size == 0 {
        return Err(LoupeError::invalid_argument("page_size must be > 0"));
    }

    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    let items = items.into_iter().skip(start).take(end - start).collect();

    Ok(Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_cover_all_items() {
        let items: Vec<u32> = (0..23).collect();
        let mut collected = Vec::new();

        for page in 1..=3 {
            let result = paginate(items.clone(), page, 10).unwrap();
            assert_eq!(result.total_items, 23);
            assert_eq!(result.total_pages, 3);
            collected.extend(result.items);
        }

        assert_eq!(collected, items);
    }

    #[test]
    fn test_last_partial_page() {
        let page = paginate((0..23).collect::<Vec<_>>(), 3, 10).unwrap();
        assert_eq!(page.items, vec![20, 21, 22]);
        assert!(!page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn test_past_end_is_empty() {
        let page = paginate(vec![1, 2, 3], 5, 2).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 5);

        let huge = paginate(vec![1], usize::MAX, usize::MAX).unwrap();
        assert!(huge.items.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let page = paginate(Vec::<u8>::new(), 1, 10).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            paginate(vec![1], 0, 10),
            Err(LoupeError::InvalidArgument(_))
        ));
        assert!(matches!(
            paginate(vec![1], 1, 0),
            Err(LoupeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_try_map() {
        let page = paginate(vec![1, 2, 3], 1, 2).unwrap();
        let mapped = page.try_map(|n| Ok(n * 10)).unwrap();
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.total_items, 3);
    }
}
