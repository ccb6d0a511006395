//! Run-level services: the collection loop, the classification pass, and
//! the outbound sinks (webhook, feed, report).

pub mod collect;
pub mod feed;
#[cfg(feature = "browser")]
pub mod language;
pub mod notify;
pub mod report;

pub use collect::{collect_source, CollectOutcome};
