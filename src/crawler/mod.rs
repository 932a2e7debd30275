//! Crawler module: traversal, fetching, and document acquisition
//!
//! Breadth-first link traversal over a site with host scoping, a
//! bounded retry policy for fetches, and acquisition of PDF candidates
//! into a download directory. Strictly sequential: one URL in flight
//! at a time.

mod acquire;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use acquire::{acquire, filename_for};
pub use coordinator::{CrawlError, Crawler};
pub use fetcher::{build_http_client, fetch_bytes, fetch_page, FetchError, FetchedPage, RetryPolicy};
pub use frontier::{normalize, Frontier};
pub use parser::{extract_links, is_pdf_url};
