use serde::Serialize;

/// One window over an ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    pub fn of(items: &[T], page: usize, page_size: usize) -> Self {
        Self {
            items: paginate(items, page, page_size),
            page,
            page_size,
            total: items.len(),
            total_pages: page_count(items.len(), page_size),
        }
    }
}

/// Items in `[(page-1)*page_size, page*page_size)`, clamped to the slice.
///
/// Pages are 1-based. Page 0 and pages past the end yield an empty vec.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    if page == 0 || page_size == 0 {
        return Vec::new();
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(items.len());
    items[start..end].to_vec()
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Page numbers to show as buttons, centred on `current` and clamped to
/// `[1, total_pages]`.
pub fn visible_page_window(current: usize, total_pages: usize, max_buttons: usize) -> Vec<usize> {
    if total_pages == 0 || max_buttons == 0 {
        return Vec::new();
    }

    let mut start = current.saturating_sub(max_buttons / 2).max(1);
    let mut end = start.saturating_add(max_buttons - 1);

    if end > total_pages {
        end = total_pages;
        start = (end + 1).saturating_sub(max_buttons).max(1);
    }

    (start..=end).collect()
}

/// Navigation buttons for one paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub current: usize,
    pub total_pages: usize,
    pub pages: Vec<usize>,
    /// First/Prev are offered only past page 1.
    pub show_first_prev: bool,
    /// Next/Last are offered only before the last page.
    pub show_next_last: bool,
}

/// Independent current-page cursor for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current: usize,
    page_size: usize,
    max_buttons: usize,
}

impl PageCursor {
    pub fn new(page_size: usize, max_buttons: usize) -> Self {
        Self {
            current: 1,
            page_size,
            max_buttons,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jump to `page`. No upper clamp: a stale cursor past the end just
    /// yields an empty page.
    pub fn goto(&mut self, page: usize) {
        self.current = page.max(1);
    }

    pub fn first(&mut self) {
        self.current = 1;
    }

    pub fn prev(&mut self) {
        self.current = self.current.saturating_sub(1).max(1);
    }

    pub fn next(&mut self, total: usize) {
        if self.current < page_count(total, self.page_size) {
            self.current += 1;
        }
    }

    pub fn last(&mut self, total: usize) {
        self.current = page_count(total, self.page_size).max(1);
    }

    pub fn page_of<T: Clone>(&self, items: &[T]) -> Page<T> {
        Page::of(items, self.current, self.page_size)
    }

    /// Controls to render, or `None` when everything fits on one page.
    pub fn controls(&self, total: usize) -> Option<PageControls> {
        let total_pages = page_count(total, self.page_size);
        if total_pages <= 1 {
            return None;
        }
        Some(PageControls {
            current: self.current,
            total_pages,
            pages: visible_page_window(self.current, total_pages, self.max_buttons),
            show_first_prev: self.current > 1,
            show_next_last: self.current < total_pages,
        })
    }
}
