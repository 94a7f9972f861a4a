//! Page windows over an ordered result set.

use core::ops::Range;

/// Errors that can occur when building a [`PageRequest`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// `page` or `page_count` was not a base-10 integer.
    #[error("{field} must be a positive integer (got {value:?})")]
    NotANumber {
        /// Query parameter name.
        field: &'static str,
        /// Raw value received.
        value: String,
    },
    /// Pages are numbered from 1.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page holds at least one item.
    #[error("page_count must be at least 1")]
    ZeroPageSize,
    /// Requested page size exceeds the configured maximum.
    #[error("page_count must be at most {max} (got {value})")]
    PageSizeTooLarge {
        /// Requested size.
        value: u32,
        /// Configured maximum.
        max: u32,
    },
}

/// 1-based page number and page size.
///
/// Page `p` of size `n` covers the half-open window `[(p-1)*n, p*n)` of the
/// ordered result set, so consecutive pages never overlap and together cover
/// every row exactly once.
///
/// ```
/// use threadline_core::PageRequest;
///
/// let page = PageRequest::new(3, 20, 100).unwrap();
/// assert_eq!(page.window(), 40..60);
/// assert_eq!(page.offset(), 40);
/// assert_eq!(page.limit(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Field name used in errors for the page number.
    pub const PAGE_FIELD: &'static str = "page";
    /// Field name used in errors for the page size.
    pub const SIZE_FIELD: &'static str = "page_count";

    /// Validate a page number and size.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] for a zero page, a zero size, or a size above
    /// `max_size`.
    pub const fn new(page: u32, size: u32, max_size: u32) -> Result<Self, PageError> {
        if page == 0 {
            return Err(PageError::ZeroPage);
        }
        if size == 0 {
            return Err(PageError::ZeroPageSize);
        }
        if size > max_size {
            return Err(PageError::PageSizeTooLarge {
                value: size,
                max: max_size,
            });
        }
        Ok(Self { page, size })
    }

    /// Build from raw query-string values, applying defaults for absent ones.
    ///
    /// A missing `page` means page 1; a missing `page_count` means
    /// `default_size`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NotANumber`] for non-numeric input and the
    /// errors of [`new`](Self::new) otherwise.
    pub fn parse(
        page: Option<&str>,
        size: Option<&str>,
        default_size: u32,
        max_size: u32,
    ) -> Result<Self, PageError> {
        let page = parse_field(Self::PAGE_FIELD, page)?.unwrap_or(1);
        let size = parse_field(Self::SIZE_FIELD, size)?.unwrap_or(default_size);
        Self::new(page, size, max_size)
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn size(self) -> u32 {
        self.size
    }

    /// Row range covered by this page.
    #[must_use]
    pub const fn window(self) -> Range<u64> {
        let start = (self.page as u64 - 1) * self.size as u64;
        start..start + self.size as u64
    }

    /// SQL `OFFSET`.
    #[must_use]
    pub const fn offset(self) -> i64 {
        // u32 * u32 fits in i64 with room to spare.
        #[allow(clippy::cast_possible_wrap)]
        let offset = self.window().start as i64;
        offset
    }

    /// SQL `LIMIT`.
    #[must_use]
    pub const fn limit(self) -> i64 {
        self.size as i64
    }
}

fn parse_field(field: &'static str, raw: Option<&str>) -> Result<Option<u32>, PageError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| PageError::NotANumber {
                field,
                value: s.to_owned(),
            })
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_starts_at_zero() {
        let page = PageRequest::new(1, 16, 100).unwrap();
        assert_eq!(page.window(), 0..16);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 16);
    }

    #[test]
    fn test_pages_are_contiguous_and_disjoint() {
        let size = 7;
        let mut covered = Vec::new();
        for p in 1..=5 {
            covered.extend(PageRequest::new(p, size, 100).unwrap().window());
        }
        let expected: Vec<u64> = (0..35).collect();
        assert_eq!(covered, expected);
    }

    #[test]
    fn test_parse_defaults() {
        let page = PageRequest::parse(None, None, 16, 100).unwrap();
        assert_eq!((page.page(), page.size()), (1, 16));

        let page = PageRequest::parse(Some(""), Some(" 2 "), 16, 100).unwrap();
        assert_eq!((page.page(), page.size()), (1, 2));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(
            PageRequest::parse(Some("two"), None, 16, 100),
            Err(PageError::NotANumber {
                field: "page",
                value: "two".into()
            })
        );
        assert!(matches!(
            PageRequest::parse(None, Some("-1"), 16, 100),
            Err(PageError::NotANumber {
                field: "page_count",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_and_oversized() {
        assert_eq!(PageRequest::new(0, 10, 100), Err(PageError::ZeroPage));
        assert_eq!(PageRequest::new(1, 0, 100), Err(PageError::ZeroPageSize));
        assert_eq!(
            PageRequest::new(1, 101, 100),
            Err(PageError::PageSizeTooLarge { value: 101, max: 100 })
        );
    }

    #[test]
    fn test_large_page_numbers_do_not_overflow() {
        let page = PageRequest::new(u32::MAX, 100, 100).unwrap();
        assert_eq!(page.offset(), (i64::from(u32::MAX) - 1) * 100);
    }
}
