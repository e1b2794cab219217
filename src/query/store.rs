use super::error::QueryError;
use async_trait::async_trait;
use sea_orm::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

const SAMPLE_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Real(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{}", v),
            Cell::Text(v) => f.write_str(v),
            Cell::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The relational store the query tool runs against.
#[async_trait]
pub trait SqlStore: Send + Sync {
    /// `CREATE TABLE` statements plus a few sample rows per table, used as
    /// the schema section of the generation prompt.
    async fn table_info(&self) -> Result<String, QueryError>;
    async fn fetch(&self, sql: &str) -> Result<RowSet, QueryError>;
    async fn execute(&self, sql: &str) -> Result<u64, QueryError>;
}

pub struct SqliteStore {
    db_url: String,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, QueryError> {
        if !path.exists() {
            return Err(QueryError::Store(format!(
                "database file '{}' not found",
                path.display()
            )));
        }
        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        info!("Using SQLite database at {}", path.display());
        Ok(Self { db_url })
    }

    fn connect(db_url: &str) -> Result<DatabaseConnection, QueryError> {
        Database::connect(db_url).map_err(|e| QueryError::Store(e.to_string()))
    }
}

fn execution_error(sql: &str, e: DbErr) -> QueryError {
    QueryError::Execution {
        sql: sql.to_string(),
        message: e.to_string(),
    }
}

fn decode_cell(row: &QueryResult, idx: usize) -> Cell {
    if let Ok(v) = row.try_get_by_index::<Option<i64>>(idx) {
        return v.map(Cell::Integer).unwrap_or(Cell::Null);
    }
    if let Ok(Some(v)) = row.try_get_by_index::<Option<f64>>(idx) {
        return Cell::Real(v);
    }
    if let Ok(Some(v)) = row.try_get_by_index::<Option<String>>(idx) {
        return Cell::Text(v);
    }
    if let Ok(Some(v)) = row.try_get_by_index::<Option<Vec<u8>>>(idx) {
        return Cell::Blob(v);
    }
    Cell::Null
}

fn query_rows(db: &DatabaseConnection, sql: &str) -> Result<RowSet, DbErr> {
    let results = db.query_all_raw(Statement::from_string(DbBackend::Sqlite, sql))?;

    let columns = results
        .first()
        .map(|row| row.column_names())
        .unwrap_or_default();
    let rows = results
        .iter()
        .map(|row| (0..columns.len()).map(|idx| decode_cell(row, idx)).collect())
        .collect();

    Ok(RowSet { columns, rows })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn describe_tables(db: &DatabaseConnection) -> Result<String, DbErr> {
    let tables = query_rows(
        db,
        "SELECT name, sql FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;

    let mut sections = Vec::with_capacity(tables.len());
    for table in &tables.rows {
        let (Some(Cell::Text(name)), Some(Cell::Text(ddl))) = (table.first(), table.get(1)) else {
            continue;
        };

        let sample = query_rows(
            db,
            &format!("SELECT * FROM {} LIMIT {}", quote_ident(name), SAMPLE_ROWS),
        )?;

        let mut section = format!(
            "{}\n\n/*\n{} rows from {} table:\n",
            ddl.trim(),
            SAMPLE_ROWS,
            name
        );
        if !sample.columns.is_empty() {
            section.push_str(&sample.columns.join("\t"));
            section.push('\n');
        }
        for row in &sample.rows {
            let values: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            section.push_str(&values.join("\t"));
            section.push('\n');
        }
        section.push_str("*/");
        sections.push(section);
    }

    Ok(sections.join("\n\n\n"))
}

#[async_trait]
impl SqlStore for SqliteStore {
    async fn table_info(&self) -> Result<String, QueryError> {
        let db_url = self.db_url.clone();

        tokio::task::spawn_blocking(move || -> Result<String, QueryError> {
            let db = Self::connect(&db_url)?;
            describe_tables(&db).map_err(|e| QueryError::Store(e.to_string()))
        })
        .await
        .map_err(|e| QueryError::Store(e.to_string()))?
    }

    async fn fetch(&self, sql: &str) -> Result<RowSet, QueryError> {
        let db_url = self.db_url.clone();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || -> Result<RowSet, QueryError> {
            let db = Self::connect(&db_url)?;
            query_rows(&db, &sql).map_err(|e| execution_error(&sql, e))
        })
        .await
        .map_err(|e| QueryError::Store(e.to_string()))?
    }

    async fn execute(&self, sql: &str) -> Result<u64, QueryError> {
        let db_url = self.db_url.clone();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || -> Result<u64, QueryError> {
            let db = Self::connect(&db_url)?;
            let result = db
                .execute_unprepared(&sql)
                .map_err(|e| execution_error(&sql, e))?;
            Ok(result.rows_affected())
        })
        .await
        .map_err(|e| QueryError::Store(e.to_string()))?
    }
}
