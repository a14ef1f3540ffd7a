//! `SQLite` implementation of [`ReportStore`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{ReportRecord, ReportStore, StoredReport};
use crate::core::ResearchMode;
use crate::error::StorageError;

/// Default page size for [`SqliteReportStore::list_reports`].
pub const DEFAULT_LIST_LIMIT: usize = 50;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS reports (
    id                  TEXT PRIMARY KEY,
    query               TEXT NOT NULL,
    mode                TEXT NOT NULL CHECK (mode IN ('quick', 'deep')),
    summary             TEXT NOT NULL,
    goals               TEXT NOT NULL,
    methodology         TEXT NOT NULL,
    findings            TEXT NOT NULL,
    competitors         TEXT,
    risks               TEXT NOT NULL,
    opportunities       TEXT NOT NULL,
    recommendations     TEXT NOT NULL,
    confidence_score    REAL NOT NULL CHECK (confidence_score BETWEEN 0.0 AND 1.0),
    markdown_report     TEXT NOT NULL,
    follow_up_questions TEXT NOT NULL DEFAULT '[]',
    created_at          TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports (created_at DESC);
";

const SELECT_COLUMNS: &str = "id, created_at, query, mode, summary, goals, methodology, \
     findings, competitors, risks, opportunities, recommendations, confidence_score, \
     markdown_report, follow_up_questions";

/// Report store backed by a single `SQLite` connection.
#[derive(Debug)]
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
}

impl SqliteReportStore {
    /// Opens (or creates) the database file at `path`.
    ///
    /// Parent directories are created as needed. The schema is not
    /// created; call [`init`](Self::init).
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database with the schema applied.
    pub fn in_memory() -> Result<Self, StorageError> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init()?;
        Ok(store)
    }

    /// Creates the schema if it does not exist.
    pub fn init(&self) -> Result<(), StorageError> {
        self.lock().execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Drops and recreates the schema.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.lock()
            .execute_batch("DROP INDEX IF EXISTS idx_reports_created_at; DROP TABLE IF EXISTS reports;")?;
        self.init()
    }

    /// Returns `true` once the schema exists.
    pub fn is_initialized(&self) -> Result<bool, StorageError> {
        let count: i64 = self.lock().query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'reports'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Fetches a report by its full identifier.
    pub fn get_report(&self, id: &str) -> Result<Option<StoredReport>, StorageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM reports WHERE id = ?1");
        let report = self
            .lock()
            .query_row(&sql, params![id], row_to_report)
            .optional()?;
        Ok(report)
    }

    /// Fetches reports whose identifier starts with `prefix`, newest first.
    pub fn find_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<StoredReport>, StorageError> {
        let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM reports WHERE id LIKE ?1 ESCAPE '\\' \
             ORDER BY created_at DESC LIMIT ?2"
        );
        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![format!("{escaped}%"), to_sql_limit(limit)], row_to_report)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Lists the most recent reports, newest first.
    pub fn list_reports(&self, limit: usize) -> Result<Vec<StoredReport>, StorageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM reports ORDER BY created_at DESC LIMIT ?1");
        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![to_sql_limit(limit)], row_to_report)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of saved reports.
    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportStore for SqliteReportStore {
    fn save(&self, record: &ReportRecord) -> Result<String, StorageError> {
        record.validate()?;

        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true);
        let follow_ups = serde_json::to_string(&record.follow_up_questions).map_err(|e| {
            StorageError::InvalidRecord {
                message: format!("follow_up_questions not serializable: {e}"),
            }
        })?;

        self.lock().execute(
            "INSERT INTO reports (id, query, mode, summary, goals, methodology, findings, \
             competitors, risks, opportunities, recommendations, confidence_score, \
             markdown_report, follow_up_questions, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                id,
                record.query,
                record.mode.as_str(),
                record.summary,
                record.goals,
                record.methodology,
                record.findings,
                record.competitors,
                record.risks,
                record.opportunities,
                record.recommendations,
                record.confidence_score,
                record.markdown_report,
                follow_ups,
                created_at,
            ],
        )?;

        tracing::debug!(report_id = %id, "report saved");
        Ok(id)
    }
}

fn to_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn row_to_report(row: &Row<'_>) -> rusqlite::Result<StoredReport> {
    let mode: String = row.get(3)?;
    let mode = mode
        .parse::<ResearchMode>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;
    let follow_ups: String = row.get(14)?;
    let follow_up_questions: Vec<String> = serde_json::from_str(&follow_ups)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e)))?;

    Ok(StoredReport {
        id: row.get(0)?,
        created_at: row.get(1)?,
        record: ReportRecord {
            query: row.get(2)?,
            mode,
            summary: row.get(4)?,
            goals: row.get(5)?,
            methodology: row.get(6)?,
            findings: row.get(7)?,
            competitors: row.get(8)?,
            risks: row.get(9)?,
            opportunities: row.get(10)?,
            recommendations: row.get(11)?,
            confidence_score: row.get(12)?,
            markdown_report: row.get(13)?,
            follow_up_questions,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReportData;
    use tempfile::TempDir;

    fn sample(query: &str, score: f64) -> ReportRecord {
        let report = ReportData {
            summary: "summary".to_string(),
            goals: "goals".to_string(),
            methodology: "methodology".to_string(),
            findings: "findings".to_string(),
            competitors: None,
            risks: "risks".to_string(),
            opportunities: "opportunities".to_string(),
            recommendations: "recommendations".to_string(),
            confidence_score: score,
            markdown_report: format!("# {query}"),
            follow_up_questions: vec!["next?".to_string()],
        };
        ReportRecord::from_report(query, ResearchMode::Quick, &report)
    }

    #[test]
    fn test_save_and_get() {
        let store = SqliteReportStore::in_memory().unwrap_or_else(|_| unreachable!());
        let id = store.save(&sample("rust", 0.7)).unwrap_or_else(|_| unreachable!());
        assert_eq!(id.len(), 36);

        let stored = store
            .get_report(&id)
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(stored.record, sample("rust", 0.7));
        assert!(!stored.created_at.is_empty());
    }

    #[test]
    fn test_missing_report() {
        let store = SqliteReportStore::in_memory().unwrap_or_else(|_| unreachable!());
        let found = store.get_report("nope").unwrap_or_else(|_| unreachable!());
        assert!(found.is_none());
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let store = SqliteReportStore::in_memory().unwrap_or_else(|_| unreachable!());
        let result = store.save(&sample("rust", 1.2));
        assert!(matches!(result, Err(StorageError::InvalidRecord { .. })));
        assert_eq!(store.count().unwrap_or_else(|_| unreachable!()), 0);
    }

    #[test]
    fn test_save_without_schema_fails() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let store = SqliteReportStore::open(&dir.path().join("reports.db"))
            .unwrap_or_else(|_| unreachable!());
        assert!(!store.is_initialized().unwrap_or_else(|_| unreachable!()));
        assert!(matches!(
            store.save(&sample("rust", 0.5)),
            Err(StorageError::Database(_))
        ));
    }

    #[test]
    fn test_unwritable_parent_is_io_error() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap_or_else(|_| unreachable!());
        let result = SqliteReportStore::open(&blocker.join("nested").join("reports.db"));
        let Err(err) = result else { unreachable!() };
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(err.kind(), "Io");
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let store = SqliteReportStore::in_memory().unwrap_or_else(|_| unreachable!());
        for query in ["first", "second", "third"] {
            store.save(&sample(query, 0.5)).unwrap_or_else(|_| unreachable!());
        }
        let listed = store.list_reports(2).unwrap_or_else(|_| unreachable!());
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].record.query, "third");
        assert_eq!(listed[1].record.query, "second");
    }

    #[test]
    fn test_find_by_prefix() {
        let store = SqliteReportStore::in_memory().unwrap_or_else(|_| unreachable!());
        let id = store.save(&sample("rust", 0.5)).unwrap_or_else(|_| unreachable!());
        let found = store
            .find_by_prefix(&id[..8], 2)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert!(
            store
                .find_by_prefix("%", 2)
                .unwrap_or_else(|_| unreachable!())
                .is_empty()
        );
    }

    #[test]
    fn test_reopen_persists() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("nested").join("reports.db");
        let id = {
            let store = SqliteReportStore::open(&path).unwrap_or_else(|_| unreachable!());
            store.init().unwrap_or_else(|_| unreachable!());
            store.save(&sample("persisted", 0.4)).unwrap_or_else(|_| unreachable!())
        };
        let store = SqliteReportStore::open(&path).unwrap_or_else(|_| unreachable!());
        assert!(store.is_initialized().unwrap_or_else(|_| unreachable!()));
        assert!(store.get_report(&id).unwrap_or_else(|_| unreachable!()).is_some());
    }

    #[test]
    fn test_reset_clears_reports() {
        let store = SqliteReportStore::in_memory().unwrap_or_else(|_| unreachable!());
        store.save(&sample("gone", 0.5)).unwrap_or_else(|_| unreachable!());
        store.reset().unwrap_or_else(|_| unreachable!());
        assert_eq!(store.count().unwrap_or_else(|_| unreachable!()), 0);
    }
}
