//! Data models for Serendip.

mod site;

pub use site::{Candidate, LanguageStatus, LanguageVerdict, SiteRecord, SourceTag};
