use super::error::QueryError;
use super::sanitizer::returns_rows;
use super::store::{RowSet, SqlStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryOutcome {
    Rows(RowSet),
    Executed { rows_affected: u64 },
}

/// Runs cleaned SQL: statements that yield a result set return rows,
/// everything else goes through the generic execute path.
pub struct QueryExecutor {
    store: Arc<dyn SqlStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn SqlStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, sql: &str) -> Result<QueryOutcome, QueryError> {
        if returns_rows(sql) {
            debug!("Fetching rows for: {}", sql);
            Ok(QueryOutcome::Rows(self.store.fetch(sql).await?))
        } else {
            debug!("Executing statement: {}", sql);
            let rows_affected = self.store.execute(sql).await?;
            Ok(QueryOutcome::Executed { rows_affected })
        }
    }

    pub async fn table_info(&self) -> Result<String, QueryError> {
        self.store.table_info().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::store::Cell;
    use crate::query::store::tests::seeded_store;

    #[tokio::test]
    async fn select_returns_rows() {
        let (_dir, store) = seeded_store().await;
        let executor = QueryExecutor::new(Arc::new(store));

        let outcome = executor
            .run("select NAME from STUDENT where MARKS = 100")
            .await
            .unwrap();

        match outcome {
            QueryOutcome::Rows(rows) => {
                assert_eq!(rows.rows, vec![vec![Cell::Text("Itachi".into())]]);
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_select_uses_execute_path() {
        let (_dir, store) = seeded_store().await;
        let executor = QueryExecutor::new(Arc::new(store));

        let outcome = executor
            .run("DELETE FROM STUDENT WHERE MARKS < 40")
            .await
            .unwrap();

        assert_eq!(outcome, QueryOutcome::Executed { rows_affected: 1 });
    }

    #[tokio::test]
    async fn cte_select_returns_rows() {
        let (_dir, store) = seeded_store().await;
        let executor = QueryExecutor::new(Arc::new(store));

        let outcome = executor
            .run(
                "WITH top AS (SELECT NAME, MARKS FROM STUDENT WHERE MARKS >= 95) \
                 SELECT NAME FROM top ORDER BY MARKS DESC",
            )
            .await
            .unwrap();

        match outcome {
            QueryOutcome::Rows(rows) => {
                assert_eq!(
                    rows.rows,
                    vec![
                        vec![Cell::Text("Itachi".into())],
                        vec![Cell::Text("Raghav".into())],
                    ]
                );
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pragma_returns_rows() {
        let (_dir, store) = seeded_store().await;
        let executor = QueryExecutor::new(Arc::new(store));

        let outcome = executor.run("PRAGMA table_info(STUDENT)").await.unwrap();

        match outcome {
            QueryOutcome::Rows(rows) => {
                assert_eq!(rows.len(), 5);
                assert!(rows.columns.iter().any(|c| c == "name"));
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn cte_delete_reports_rows_affected() {
        let (_dir, store) = seeded_store().await;
        let executor = QueryExecutor::new(Arc::new(store));

        let outcome = executor
            .run(
                "WITH low AS (SELECT ID FROM STUDENT WHERE MARKS < 40) \
                 DELETE FROM STUDENT WHERE ID IN (SELECT ID FROM low)",
            )
            .await
            .unwrap();

        assert_eq!(outcome, QueryOutcome::Executed { rows_affected: 1 });
    }

    #[tokio::test]
    async fn invalid_sql_surfaces_store_error_text() {
        let (_dir, store) = seeded_store().await;
        let executor = QueryExecutor::new(Arc::new(store));

        let err = executor.run("SELEC NAME FROM STUDENT").await.unwrap_err();

        assert!(matches!(err, QueryError::Execution { .. }));
    }
}
