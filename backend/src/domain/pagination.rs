//! Offset pagination primitives shared by listing operations.

/// Default page size when callers do not provide one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size accepted from callers.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised when a page request is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `size` was zero or above [`MAX_PAGE_SIZE`].
    #[error("page size must be between 1 and {max}, got {size}")]
    SizeOutOfRange { size: u32, max: u32 },
}

/// Zero-based page index and page size.
///
/// # Examples
/// ```
/// use donations::domain::PageRequest;
///
/// let page = PageRequest::new(2, 10).unwrap();
/// assert_eq!(page.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Validate a page request.
    pub fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::SizeOutOfRange {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Slice an in-memory, already ordered collection.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(self.size).unwrap_or(usize::MAX);
        let items = items.into_iter().skip(offset).take(size).collect();
        Page::new(items, total, *self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results together with the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
        }
    }

    /// Total number of pages for the current size.
    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.size.max(1));
        self.total.div_ceil(size)
    }

    /// Transform the items while keeping page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}
