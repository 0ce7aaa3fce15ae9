use super::error::FilterError;

/// A validated page request. `page_number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_number: u64,
    page_size: u64,
}

impl Pagination {
    /// Shared check for the HTTP boundary and the service layer
    pub fn new(page_number: i64, page_size: i64) -> Result<Self, FilterError> {
        if page_size < 1 {
            return Err(FilterError::InvalidPageSize(page_size));
        }
        if page_number < 1 {
            return Err(FilterError::InvalidPageNumber(page_number));
        }

        let pagination = Self {
            page_number: page_number as u64,
            page_size: page_size as u64,
        };
        // Offsets are bound as bigint
        if pagination.checked_offset().map_or(true, |o| o > i64::MAX as u64) {
            return Err(FilterError::InvalidPageNumber(page_number));
        }
        Ok(pagination)
    }

    /// Clamp the page size to `max`, reporting whether it was reduced
    pub fn capped(self, max: u64) -> (Self, bool) {
        let max = max.max(1);
        if self.page_size > max {
            (Self { page_size: max, ..self }, true)
        } else {
            (self, false)
        }
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.checked_offset().unwrap_or(u64::MAX)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    fn checked_offset(&self) -> Option<u64> {
        (self.page_number - 1).checked_mul(self.page_size)
    }
}
