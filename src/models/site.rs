//! Site catalog models.
//!
//! A `SiteRecord` is the unit of persistence: one row per discovered URL,
//! created once at acceptance time and never deleted. Language fields are
//! back-filled later for directory-listing records only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tagged origin of candidate items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    Kb512Club,
    IndieBlog,
    HackerNewsNew,
    HackerNewsShow,
    Linkwarden,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kb512Club => "512kb.club",
            Self::IndieBlog => "indieblog.page",
            Self::HackerNewsNew => "hackernews-new",
            Self::HackerNewsShow => "hackernews-show",
            Self::Linkwarden => "linkwarden",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "512kb.club" => Some(Self::Kb512Club),
            "indieblog.page" => Some(Self::IndieBlog),
            "hackernews-new" => Some(Self::HackerNewsNew),
            "hackernews-show" => Some(Self::HackerNewsShow),
            "linkwarden" => Some(Self::Linkwarden),
            _ => None,
        }
    }

    /// Human-readable label for report and web output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kb512Club => "512KB Club",
            Self::IndieBlog => "IndieWeb Blogs",
            Self::HackerNewsNew => "Hacker News (new)",
            Self::HackerNewsShow => "Hacker News (show)",
            Self::Linkwarden => "Linkwarden Bookmarks",
        }
    }

    /// All known tags, in collection order.
    pub fn all() -> &'static [SourceTag] {
        &[
            Self::Kb512Club,
            Self::IndieBlog,
            Self::HackerNewsNew,
            Self::HackerNewsShow,
            Self::Linkwarden,
        ]
    }

    /// Whether records from this source get a language classification pass.
    pub fn wants_language_check(&self) -> bool {
        matches!(self, Self::Kb512Club)
    }
}

/// A (URL, title) pair proposed by a source adapter, not yet checked
/// against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub title: String,
}

impl Candidate {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Outcome category of a language classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageStatus {
    EnglishSite,
    NonEnglish,
    Error,
    Unchecked,
}

impl LanguageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnglishSite => "english_site",
            Self::NonEnglish => "non_english",
            Self::Error => "error",
            Self::Unchecked => "unchecked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "english_site" => Some(Self::EnglishSite),
            "non_english" => Some(Self::NonEnglish),
            "error" => Some(Self::Error),
            "unchecked" => Some(Self::Unchecked),
            _ => None,
        }
    }
}

/// Result of one language classification pass over a site.
#[derive(Debug, Clone)]
pub struct LanguageVerdict {
    pub is_english: bool,
    pub status: LanguageStatus,
    /// Freeform markdown fragment describing the finding.
    pub notes: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl LanguageVerdict {
    pub fn new(is_english: bool, status: LanguageStatus, notes: Option<String>) -> Self {
        Self {
            is_english,
            status,
            notes,
            checked_at: Utc::now(),
        }
    }
}

/// A persisted catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Database row ID.
    pub id: i64,
    /// Globally unique key, regardless of source.
    pub url: String,
    pub title: String,
    /// Adapter tag that produced the record (kept as raw text so rows
    /// written by older versions still load).
    pub source: String,
    /// Set at insert time, immutable afterwards.
    pub capture_date: DateTime<Utc>,
    /// Set at most once by the classifier; `None` means not yet checked.
    pub language_flag: Option<bool>,
    pub language_status: Option<LanguageStatus>,
    pub language_notes: Option<String>,
    pub language_checked_at: Option<DateTime<Utc>>,
}

impl SiteRecord {
    /// Create a fresh record from an accepted candidate.
    pub fn from_candidate(candidate: &Candidate, source: SourceTag) -> Self {
        Self {
            id: 0, // Set by database
            url: candidate.url.clone(),
            title: candidate.title.clone(),
            source: source.as_str().to_string(),
            capture_date: Utc::now(),
            language_flag: None,
            language_status: None,
            language_notes: None,
            language_checked_at: None,
        }
    }

    pub fn source_tag(&self) -> Option<SourceTag> {
        SourceTag::from_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tag_round_trip() {
        for tag in SourceTag::all() {
            assert_eq!(SourceTag::from_str(tag.as_str()), Some(*tag));
        }
        assert_eq!(SourceTag::from_str("geocities"), None);
    }

    #[test]
    fn test_language_status_round_trip() {
        for status in [
            LanguageStatus::EnglishSite,
            LanguageStatus::NonEnglish,
            LanguageStatus::Error,
            LanguageStatus::Unchecked,
        ] {
            assert_eq!(LanguageStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_only_directory_source_wants_language_check() {
        let wanting: Vec<_> = SourceTag::all()
            .iter()
            .filter(|t| t.wants_language_check())
            .collect();
        assert_eq!(wanting, vec![&SourceTag::Kb512Club]);
    }

    #[test]
    fn test_record_from_candidate_starts_unclassified() {
        let record = SiteRecord::from_candidate(
            &Candidate::new("https://example.com", "Example"),
            SourceTag::IndieBlog,
        );
        assert_eq!(record.source, "indieblog.page");
        assert!(record.language_flag.is_none());
        assert!(record.language_status.is_none());
    }
}
