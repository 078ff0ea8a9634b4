//! Due-item scanning.
//!
//! Repositories return due candidates one keyset page at a time, ordered by
//! `(key, id)`. [`PagedScan`] stitches those pages into an iterator so a job
//! only ever holds one page in memory, however many owners are due.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::errors::Result;
use crate::owners::OwnerContact;

/// Position of the last item handed out by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor {
    pub key: DateTime<Utc>,
    pub id: String,
}

/// A due record with its owner joined at scan time.
///
/// `owner` is `None` when the owner row could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DueItem<T> {
    pub record: T,
    pub owner: Option<OwnerContact>,
    pub cursor: ScanCursor,
}

type PageFetcher<'a, T> =
    Box<dyn FnMut(Option<&ScanCursor>, i64) -> Result<Vec<DueItem<T>>> + Send + 'a>;

/// Iterator over keyset-paginated due items.
///
/// A failed page fetch is yielded once as `Err` and ends the scan.
pub struct PagedScan<'a, T> {
    fetch: PageFetcher<'a, T>,
    page_size: i64,
    buffer: VecDeque<DueItem<T>>,
    cursor: Option<ScanCursor>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a, T> PagedScan<'a, T> {
    pub fn new<F>(page_size: i64, fetch: F) -> Self
    where
        F: FnMut(Option<&ScanCursor>, i64) -> Result<Vec<DueItem<T>>> + Send + 'a,
    {
        Self {
            fetch: Box::new(fetch),
            page_size: page_size.max(1),
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fill(&mut self) -> Result<()> {
        let page = (self.fetch)(self.cursor.as_ref(), self.page_size)?;
        self.pages_fetched += 1;
        if (page.len() as i64) < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.cursor = Some(last.cursor.clone());
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl<T> Iterator for PagedScan<'_, T> {
    type Item = Result<DueItem<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
