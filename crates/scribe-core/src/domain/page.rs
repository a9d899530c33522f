//! Page-number pagination over ordered listings.

/// A requested page, as it arrived in the query string.
///
/// Resolution never fails: a missing or malformed number yields the first
/// page, an out-of-range one yields the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    raw: Option<String>,
    page_size: u64,
}

impl PageRequest {
    pub fn new(raw: Option<String>, page_size: u64) -> Self {
        Self {
            raw,
            page_size: page_size.max(1),
        }
    }

    pub fn first(page_size: u64) -> Self {
        Self::new(None, page_size)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// The 1-based page number to serve for a listing of `total_items`.
    pub fn resolve(&self, total_items: u64) -> u64 {
        let last = num_pages(total_items, self.page_size);
        match self.raw.as_deref().map(|s| s.trim().parse::<i64>()) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && (n as u64) <= last => n as u64,
            Some(Ok(_)) => last,
        }
    }

    /// Offset of the first item on page `number`.
    pub fn offset(&self, number: u64) -> u64 {
        number.saturating_sub(1) * self.page_size
    }

    /// Slice an already ordered listing.
    pub fn slice<T>(&self, mut items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let number = self.resolve(total);
        let start = (self.offset(number) as usize).min(items.len());
        let end = (start + self.page_size as usize).min(items.len());

        let page_items = items.drain(start..end).collect();
        Page::new(page_items, number, self.page_size, total)
    }
}

/// Number of pages for a listing; an empty listing still has one page.
pub fn num_pages(total_items: u64, page_size: u64) -> u64 {
    if total_items == 0 {
        1
    } else {
        total_items.div_ceil(page_size.max(1))
    }
}

/// One page of a listing plus the metadata page navigation needs.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub num_pages: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: u64,
    pub current: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, page_size: u64, total_items: u64) -> Self {
        Self {
            items,
            number,
            page_size,
            total_items,
            num_pages: num_pages(total_items, page_size),
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 for an empty listing.
    pub fn start_index(&self) -> u64 {
        if self.total_items == 0 {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }

    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.num_pages)
            .map(|number| PageLink {
                number,
                current: number == self.number,
            })
            .collect()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            page_size: self.page_size,
            total_items: self.total_items,
            num_pages: self.num_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(raw: &str) -> PageRequest {
        PageRequest::new(Some(raw.to_string()), 10)
    }

    #[test]
    fn test_resolve_defaults_to_first_page() {
        assert_eq!(PageRequest::first(10).resolve(35), 1);
        assert_eq!(req("abc").resolve(35), 1);
        assert_eq!(req("").resolve(35), 1);
    }

    #[test]
    fn test_resolve_clamps_out_of_range_to_last_page() {
        assert_eq!(req("2").resolve(35), 2);
        assert_eq!(req("4").resolve(35), 4);
        assert_eq!(req("5").resolve(35), 4);
        assert_eq!(req("0").resolve(35), 4);
        assert_eq!(req("-3").resolve(35), 4);
        assert_eq!(req("7").resolve(0), 1);
    }

    #[test]
    fn test_slice_pages() {
        let items: Vec<u32> = (1..=11).collect();

        let first = PageRequest::first(10).slice(items.clone());
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next());
        assert!(!first.has_previous());
        assert_eq!(first.next_page_number(), Some(2));

        let second = req("2").slice(items.clone());
        assert_eq!(second.items, vec![11]);
        assert_eq!(second.start_index(), 11);
        assert_eq!(second.previous_page_number(), Some(1));
        assert_eq!(second.next_page_number(), None);

        let clamped = req("99").slice(items);
        assert_eq!(clamped.number, 2);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page = PageRequest::first(8).slice(Vec::<u32>::new());
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert_eq!(page.start_index(), 0);
        assert!(!page.has_other_pages());
    }

    #[test]
    fn test_links_mark_current_page() {
        let page: Page<u32> = Page::new(vec![], 2, 12, 30);
        let links = page.links();
        assert_eq!(links.len(), 3);
        assert!(links[1].current);
        assert!(!links[0].current && !links[2].current);
    }
}
