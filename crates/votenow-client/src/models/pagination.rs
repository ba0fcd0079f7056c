use serde::{Deserialize, Serialize};

/// A page of results from a paginated admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    #[inline]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Page selection shared by the listing filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl Page {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    pub(crate) fn append_to(&self, query: &mut Vec<(String, String)>) {
        if let Some(page) = self.page {
            query.push(("page".into(), page.to_string()));
        }
        if let Some(size) = self.page_size {
            query.push(("page_size".into(), size.to_string()));
        }
    }
}

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
