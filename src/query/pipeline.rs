use super::error::QueryError;
use super::executor::{QueryExecutor, QueryOutcome};
use super::generator::{QueryGenerator, correction_prompt};
use super::history::{ConversationTurn, QueryHistory, RECENT_TURN_COUNT};
use super::sanitizer::SqlSanitizer;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuery {
    pub raw_model_output: String,
    pub cleaned_sql: String,
}

/// The first attempt that failed and triggered the correction round.
#[derive(Debug, Clone, Serialize)]
pub struct Correction {
    pub failed_sql: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub question: String,
    pub query: GeneratedQuery,
    pub outcome: QueryOutcome,
    pub correction: Option<Correction>,
}

impl QueryReport {
    pub fn was_corrected(&self) -> bool {
        self.correction.is_some()
    }
}

/// Generate, sanitize, execute, and on an execution failure regenerate once
/// with the error fed back. The model is called at most twice per question.
pub struct QueryPipeline {
    generator: QueryGenerator,
    sanitizer: SqlSanitizer,
    executor: QueryExecutor,
    history: RwLock<QueryHistory>,
}

impl QueryPipeline {
    pub fn new(
        generator: QueryGenerator,
        sanitizer: SqlSanitizer,
        executor: QueryExecutor,
    ) -> Self {
        Self {
            generator,
            sanitizer,
            executor,
            history: RwLock::new(QueryHistory::default()),
        }
    }

    pub async fn run(&self, question: &str) -> Result<QueryReport, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        let table_info = self.executor.table_info().await?;
        let query = self.generate(question, &table_info).await?;

        match self.executor.run(&query.cleaned_sql).await {
            Ok(outcome) => {
                self.history
                    .write()
                    .await
                    .record(question, &query.cleaned_sql);
                Ok(QueryReport {
                    question: question.to_string(),
                    query,
                    outcome,
                    correction: None,
                })
            }
            Err(QueryError::Execution { sql, message }) => {
                warn!("Initial query failed, requesting a correction: {}", message);
                let prompt = correction_prompt(&sql, &message, question);
                let corrected = self.generate(&prompt, &table_info).await?;
                self.history
                    .write()
                    .await
                    .record(question, &corrected.cleaned_sql);

                let outcome = self.executor.run(&corrected.cleaned_sql).await?;
                info!("Corrected query succeeded");
                Ok(QueryReport {
                    question: question.to_string(),
                    query: corrected,
                    outcome,
                    correction: Some(Correction {
                        failed_sql: sql,
                        error: message,
                    }),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn generate(
        &self,
        question: &str,
        table_info: &str,
    ) -> Result<GeneratedQuery, QueryError> {
        let raw_model_output = self.generator.generate(question, table_info).await?;
        let cleaned_sql = self.sanitizer.sanitize(&raw_model_output);
        Ok(GeneratedQuery {
            raw_model_output,
            cleaned_sql,
        })
    }

    pub async fn recent_history(&self) -> Vec<ConversationTurn> {
        self.history.read().await.recent(RECENT_TURN_COUNT)
    }

    pub async fn table_info(&self) -> Result<String, QueryError> {
        self.executor.table_info().await
    }
}
