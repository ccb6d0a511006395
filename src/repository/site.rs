//! Site catalog repository.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode};
use tracing::info;

use super::{parse_datetime, parse_datetime_opt, RepositoryError, Result};
use crate::models::{LanguageStatus, LanguageVerdict, SiteRecord};

/// Storage capability used by the collection loop: a point existence
/// lookup and record creation. Implemented per storage backend, injected
/// once at the top of a run.
pub trait SiteStore {
    /// Whether a URL is already recorded. Always reflects the latest
    /// committed state; records may be inserted between calls.
    fn exists(&self, url: &str) -> Result<bool>;

    /// Persist an accepted candidate. The unique `url` key rejects
    /// duplicates that raced the existence check.
    fn insert(&self, record: &SiteRecord) -> Result<()>;
}

/// SQLite-backed site repository.
pub struct SiteRepository {
    db_path: PathBuf,
}

impl SiteRepository {
    /// Open (or create) the catalog, applying any missing schema additions.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        repo.migrate_columns()?;
        repo.ensure_indexes()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path).map_err(|source| RepositoryError::Open {
            path: self.db_path.clone(),
            source,
        })
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT UNIQUE NOT NULL,
                title TEXT NOT NULL,
                source TEXT NOT NULL,
                capture_date TEXT NOT NULL,
                language_flag INTEGER,
                language_status TEXT,
                language_notes TEXT,
                language_checked_at TEXT
            );
        "#,
        )?;
        Ok(())
    }

    /// Indexes are created after column migration so a database from an
    /// earlier schema version has every referenced column by the time
    /// these run.
    fn ensure_indexes(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE INDEX IF NOT EXISTS idx_sites_source
                ON sites(source);
            CREATE INDEX IF NOT EXISTS idx_sites_capture_date
                ON sites(capture_date DESC);
            CREATE INDEX IF NOT EXISTS idx_sites_language_pending
                ON sites(source) WHERE language_flag IS NULL;
        "#,
        )?;
        Ok(())
    }

    /// Apply additive schema evolution: inspect existing columns and add
    /// any that are missing. Columns are only ever appended as nullable,
    /// never removed or renamed, so databases written by every prior
    /// version of the tool keep loading.
    fn migrate_columns(&self) -> Result<()> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare("PRAGMA table_info(sites)")?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<_, _>>()?;

        let wanted = [
            ("source", "TEXT"),
            ("language_flag", "INTEGER"),
            ("language_status", "TEXT"),
            ("language_notes", "TEXT"),
            ("language_checked_at", "TEXT"),
        ];

        for (name, sql_type) in wanted {
            if !columns.iter().any(|c| c == name) {
                conn.execute(
                    &format!("ALTER TABLE sites ADD COLUMN {} {}", name, sql_type),
                    [],
                )?;
                info!("Added column: {}", name);
                if name == "source" {
                    // Rows predating the source column all came from the
                    // directory listing.
                    conn.execute(
                        "UPDATE sites SET source = '512kb.club' WHERE source IS NULL",
                        [],
                    )?;
                }
            }
        }

        Ok(())
    }

    fn site_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SiteRecord> {
        Ok(SiteRecord {
            id: row.get("id")?,
            url: row.get("url")?,
            title: row.get("title")?,
            source: row.get("source")?,
            capture_date: parse_datetime(&row.get::<_, String>("capture_date")?),
            language_flag: row.get("language_flag")?,
            language_status: row
                .get::<_, Option<String>>("language_status")?
                .as_deref()
                .and_then(LanguageStatus::from_str),
            language_notes: row.get("language_notes")?,
            language_checked_at: parse_datetime_opt(
                row.get::<_, Option<String>>("language_checked_at")?,
            ),
        })
    }

    /// Record a language verdict for a URL. Language fields are set at
    /// most once per record; other sources leave them null forever.
    pub fn update_language(&self, url: &str, verdict: &LanguageVerdict) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            UPDATE sites
            SET language_flag = ?1,
                language_status = ?2,
                language_notes = ?3,
                language_checked_at = ?4
            WHERE url = ?5
            "#,
            params![
                verdict.is_english,
                verdict.status.as_str(),
                verdict.notes,
                verdict.checked_at.to_rfc3339(),
                url,
            ],
        )?;
        Ok(())
    }

    /// Directory-listing records that have not been classified yet.
    pub fn unclassified(&self, source: &str, limit: usize) -> Result<Vec<SiteRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM sites
            WHERE source = ?1
              AND (language_flag IS NULL OR language_checked_at IS NULL)
            ORDER BY capture_date ASC
            LIMIT ?2
            "#,
        )?;
        let sites = stmt
            .query_map(params![source, limit as i64], Self::site_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    /// Every record, most-recent-first. Feeds the syndication output.
    pub fn all_recent_first(&self) -> Result<Vec<SiteRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM sites ORDER BY capture_date DESC")?;
        let sites = stmt
            .query_map([], Self::site_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    /// The most recent records for one source tag.
    pub fn recent_by_source(&self, source: &str, limit: usize) -> Result<Vec<SiteRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM sites WHERE source = ?1 ORDER BY capture_date DESC LIMIT ?2",
        )?;
        let sites = stmt
            .query_map(params![source, limit as i64], Self::site_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    /// A random sample of records for one source tag.
    pub fn random_by_source(&self, source: &str, limit: usize) -> Result<Vec<SiteRecord>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT * FROM sites WHERE source = ?1 ORDER BY RANDOM() LIMIT ?2")?;
        let sites = stmt
            .query_map(params![source, limit as i64], Self::site_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sites", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_by_source(&self, source: &str) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sites WHERE source = ?",
            params![source],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Classification status breakdown for one source tag.
    pub fn language_counts(&self, source: &str) -> Result<Vec<(String, u64)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT COALESCE(language_status, 'unchecked'), COUNT(*)
            FROM sites
            WHERE source = ?
            GROUP BY 1
            ORDER BY 2 DESC
            "#,
        )?;
        let counts = stmt
            .query_map(params![source], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}

impl SiteStore for SiteRepository {
    fn exists(&self, url: &str) -> Result<bool> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sites WHERE url = ?",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert(&self, record: &SiteRecord) -> Result<()> {
        let conn = self.connect()?;
        let result = conn.execute(
            r#"
            INSERT INTO sites (url, title, source, capture_date,
                               language_flag, language_status,
                               language_notes, language_checked_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.url,
                record.title,
                record.source,
                record.capture_date.to_rfc3339(),
                record.language_flag,
                record.language_status.map(|s| s.as_str()),
                record.language_notes,
                record.language_checked_at.map(|dt| dt.to_rfc3339()),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepositoryError::DuplicateUrl(record.url.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, SourceTag};
    use tempfile::tempdir;

    fn test_repo() -> (SiteRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let repo = SiteRepository::new(&dir.path().join("test.db")).unwrap();
        (repo, dir)
    }

    fn record(url: &str, title: &str, tag: SourceTag) -> SiteRecord {
        SiteRecord::from_candidate(&Candidate::new(url, title), tag)
    }

    #[test]
    fn test_insert_and_exists() {
        let (repo, _dir) = test_repo();

        assert!(!repo.exists("https://a.example").unwrap());
        repo.insert(&record("https://a.example", "A", SourceTag::Kb512Club))
            .unwrap();
        assert!(repo.exists("https://a.example").unwrap());
    }

    #[test]
    fn test_exists_is_idempotent() {
        let (repo, _dir) = test_repo();
        repo.insert(&record("https://a.example", "A", SourceTag::Kb512Club))
            .unwrap();

        let first = repo.exists("https://a.example").unwrap();
        let second = repo.exists("https://a.example").unwrap();
        assert_eq!(first, second);

        let first = repo.exists("https://missing.example").unwrap();
        let second = repo.exists("https://missing.example").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_insert_rejected_across_sources() {
        let (repo, _dir) = test_repo();
        repo.insert(&record("https://a.example", "A", SourceTag::Kb512Club))
            .unwrap();

        // Same URL discovered via a different adapter is still one record.
        let err = repo
            .insert(&record("https://a.example", "A again", SourceTag::IndieBlog))
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_update_language() {
        let (repo, _dir) = test_repo();
        repo.insert(&record("https://a.example", "A", SourceTag::Kb512Club))
            .unwrap();

        let verdict = LanguageVerdict::new(
            true,
            LanguageStatus::EnglishSite,
            Some("declared language `en`".to_string()),
        );
        repo.update_language("https://a.example", &verdict).unwrap();

        let sites = repo.recent_by_source("512kb.club", 10).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].language_flag, Some(true));
        assert_eq!(sites[0].language_status, Some(LanguageStatus::EnglishSite));
        assert!(sites[0].language_checked_at.is_some());
    }

    #[test]
    fn test_unclassified_only_returns_unchecked() {
        let (repo, _dir) = test_repo();
        repo.insert(&record("https://a.example", "A", SourceTag::Kb512Club))
            .unwrap();
        repo.insert(&record("https://b.example", "B", SourceTag::Kb512Club))
            .unwrap();

        let verdict = LanguageVerdict::new(false, LanguageStatus::NonEnglish, None);
        repo.update_language("https://a.example", &verdict).unwrap();

        let pending = repo.unclassified("512kb.club", 50).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, "https://b.example");
    }

    #[test]
    fn test_all_recent_first_ordering() {
        let (repo, _dir) = test_repo();

        let mut older = record("https://old.example", "Old", SourceTag::IndieBlog);
        older.capture_date = chrono::Utc::now() - chrono::Duration::days(2);
        repo.insert(&older).unwrap();
        repo.insert(&record("https://new.example", "New", SourceTag::IndieBlog))
            .unwrap();

        let all = repo.all_recent_first().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].url, "https://new.example");
        assert_eq!(all[1].url, "https://old.example");
    }

    #[test]
    fn test_migrates_legacy_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("legacy.db");

        // Earliest deployed schema: no source, no language columns.
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE sites (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT UNIQUE NOT NULL,
                    title TEXT NOT NULL,
                    capture_date TEXT NOT NULL
                );
                INSERT INTO sites (url, title, capture_date)
                VALUES ('https://legacy.example', 'Legacy', '2024-01-01T00:00:00+00:00');
            "#,
            )
            .unwrap();
        }

        let repo = SiteRepository::new(&db_path).unwrap();

        // Pre-existing rows survive, default to the directory source, and
        // report as unclassified.
        let all = repo.all_recent_first().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source, "512kb.club");
        assert!(all[0].language_flag.is_none());
        assert_eq!(repo.unclassified("512kb.club", 10).unwrap().len(), 1);

        // Reopening is a no-op.
        let repo = SiteRepository::new(&db_path).unwrap();
        assert_eq!(repo.count().unwrap(), 1);
    }
}
