//! Source-of-record abstraction.

mod page;
mod traits;

pub use page::{Page, PageRequest};
pub use traits::SourceOfRecord;
