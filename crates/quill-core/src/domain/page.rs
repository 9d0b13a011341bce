use serde::{Deserialize, Serialize};

/// Which slice of a listing to fetch. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Number of items to skip before this page starts. Saturates for page
    /// numbers far past any real listing.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the paginator metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page: total.div_ceil(request.per_page).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps_to_first_page() {
        let request = PageRequest::new(0, 20);
        assert_eq!(request.page, 1);
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        let request = PageRequest::new(u64::MAX, 20);
        assert_eq!(request.page, u64::MAX);
        assert_eq!(request.offset(), u64::MAX);

        let page = Page::<u8>::new(vec![], request, 3);
        assert_eq!(page.current_page, u64::MAX);
        assert_eq!(page.last_page, 1);
    }

    #[test]
    fn test_last_page() {
        let request = PageRequest::new(1, 20);
        assert_eq!(Page::<u8>::new(vec![], request, 0).last_page, 1);
        assert_eq!(Page::<u8>::new(vec![], request, 20).last_page, 1);
        assert_eq!(Page::<u8>::new(vec![], request, 21).last_page, 2);
    }
}
