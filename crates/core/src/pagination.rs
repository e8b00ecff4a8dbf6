//! Offset pagination for the list views (imports, import rows, saved
//! queries). Unlike query runs, these views page by the `total` the
//! backend reports.

/// Page size of the import job list.
pub const IMPORTS_PAGE_SIZE: u64 = 20;

/// Page size of the saved query list.
pub const QUERIES_PAGE_SIZE: u64 = 20;

/// Page size of the staged rows of one import.
pub const IMPORT_ROWS_PAGE_SIZE: u64 = 50;

/// Number of pages needed for `total` items; never less than one.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Clamp a requested 0-based page into `0..total_pages`.
pub fn clamp_page(page: u64, total_pages: u64) -> u64 {
    page.min(total_pages.saturating_sub(1))
}

/// `(limit, offset)` query parameters for a 0-based page.
pub fn limit_offset(page: u64, page_size: u64) -> (u64, u64) {
    (page_size, page * page_size)
}

/// Footer line shown under a listing, e.g. `Page 2 / 5 • Total 93`.
pub fn page_summary(page: u64, total: u64, page_size: u64) -> String {
    format!(
        "Page {} / {} \u{2022} Total {}",
        page + 1,
        total_pages(total, page_size),
        total
    )
}
