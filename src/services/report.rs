//! Markdown digest of recently persisted records.

use crate::models::{LanguageStatus, SourceTag};
use crate::repository::SiteRepository;
use crate::utils::escape_markdown;

const DIRECTORY_LIMIT: usize = 20;
const HN_LIMIT: usize = 20;
const INDIE_LIMIT: usize = 10;

/// Render the digest from already-persisted data.
pub fn render_report(repo: &SiteRepository) -> anyhow::Result<String> {
    let mut sections: Vec<String> = Vec::new();

    let directory = repo.recent_by_source(SourceTag::Kb512Club.as_str(), DIRECTORY_LIMIT)?;
    if !directory.is_empty() {
        let mut lines = vec!["# Recent 512KB Club Sites\n".to_string()];
        for site in &directory {
            let mut line = format!("- [{}]({})", escape_markdown(&site.title), site.url);
            match site.language_status {
                Some(LanguageStatus::NonEnglish) => line.push_str(" — non-English"),
                Some(LanguageStatus::Error) => line.push_str(" — language check failed"),
                _ => {}
            }
            if let Some(notes) = &site.language_notes {
                line.push_str(&format!(" ({})", notes));
            }
            lines.push(line);
        }
        sections.push(lines.join("\n"));
    }

    let mut hn = repo.recent_by_source(SourceTag::HackerNewsNew.as_str(), HN_LIMIT)?;
    hn.extend(repo.recent_by_source(SourceTag::HackerNewsShow.as_str(), HN_LIMIT)?);
    hn.sort_by(|a, b| b.capture_date.cmp(&a.capture_date));
    hn.truncate(HN_LIMIT);
    if !hn.is_empty() {
        let mut lines = vec!["\n# Recent Hacker News Stories\n".to_string()];
        for site in &hn {
            lines.push(format!("- [{}]({})", escape_markdown(&site.title), site.url));
        }
        sections.push(lines.join("\n"));
    }

    let indie = repo.recent_by_source(SourceTag::IndieBlog.as_str(), INDIE_LIMIT)?;
    if !indie.is_empty() {
        let mut lines = vec!["\n# Recent IndieWeb Blogs\n".to_string()];
        for site in &indie {
            lines.push(format!("- [{}]({})", escape_markdown(&site.title), site.url));
        }
        sections.push(lines.join("\n"));
    }

    Ok(sections.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, LanguageVerdict, SiteRecord};
    use crate::repository::SiteStore;
    use tempfile::tempdir;

    #[test]
    fn test_report_sections_and_escaping() {
        let dir = tempdir().unwrap();
        let repo = SiteRepository::new(&dir.path().join("test.db")).unwrap();

        repo.insert(&SiteRecord::from_candidate(
            &Candidate::new("https://tiny.example", "my [tiny] site"),
            SourceTag::Kb512Club,
        ))
        .unwrap();
        repo.update_language(
            "https://tiny.example",
            &LanguageVerdict::new(false, LanguageStatus::NonEnglish, None),
        )
        .unwrap();
        repo.insert(&SiteRecord::from_candidate(
            &Candidate::new("https://story.example", "A story"),
            SourceTag::HackerNewsNew,
        ))
        .unwrap();

        let report = render_report(&repo).unwrap();

        assert!(report.contains("# Recent 512KB Club Sites"));
        assert!(report.contains("\\[tiny\\]"));
        assert!(report.contains("non-English"));
        assert!(report.contains("# Recent Hacker News Stories"));
        assert!(report.contains("https://story.example"));
        // Empty sections are omitted entirely.
        assert!(!report.contains("IndieWeb"));
    }
}
