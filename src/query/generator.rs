use super::error::QueryError;
use crate::llm::{ChatMessage, LanguageModel, ModelRequest};
use std::sync::Arc;
use tracing::debug;

const GENERATION_TEMPERATURE: f64 = 0.0;
const DIALECT: &str = "SQLite";

/// Turns a natural-language question into SQL text with one remote completion.
pub struct QueryGenerator {
    model: Arc<dyn LanguageModel>,
    top_k: usize,
}

impl QueryGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, top_k: usize) -> Self {
        Self { model, top_k }
    }

    pub async fn generate(&self, question: &str, table_info: &str) -> Result<String, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        let request = ModelRequest::new(
            vec![
                ChatMessage::system(self.instructions(table_info)),
                ChatMessage::user(format!("Question: {}\nSQLQuery: ", question)),
            ],
            GENERATION_TEMPERATURE,
        );

        debug!("Generating SQL for: {}", question);
        let output = self.model.complete(request).await?;
        if output.trim().is_empty() {
            return Err(QueryError::Generation(
                "model returned an empty response".to_string(),
            ));
        }
        Ok(output)
    }

    fn instructions(&self, table_info: &str) -> String {
        let mut prompt = format!(
            "You are a {dialect} expert. Given an input question, first write a syntactically \
             correct {dialect} query to run, then look at the results of the query and return \
             the answer to the input question.\n\
             Unless the question asks for a specific number of examples, query for at most \
             {top_k} results using the LIMIT clause as per {dialect}. You can order the results \
             to return the most informative data in the database.\n\
             Never query for all columns from a table. Query only the columns needed to answer \
             the question. Wrap each column name in double quotes (\") to denote them as \
             delimited identifiers.\n\
             Use only the column names you can see in the tables below. Do not query for columns \
             that do not exist, and pay attention to which column is in which table.\n\
             Use the date('now') function to get the current date if the question involves \"today\".\n\n",
            dialect = DIALECT,
            top_k = self.top_k,
        );
        prompt.push_str(
            "Use the following format:\n\n\
             Question: Question here\n\
             SQLQuery: SQL Query to run\n\
             SQLResult: Result of the SQLQuery\n\
             Answer: Final answer here\n\n",
        );
        prompt.push_str("Only use the following tables:\n");
        prompt.push_str(table_info);
        prompt
    }
}

/// Question text for the single correction round after a failed execution.
pub fn correction_prompt(failed_sql: &str, error: &str, question: &str) -> String {
    format!(
        "The following SQL query failed: {}\nError: {}\nRegenerate a correct SQL query for the question: {}",
        failed_sql, error, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;

    const STUDENT_SCHEMA: &str = "CREATE TABLE STUDENT(NAME VARCHAR(50), MARKS INT)";

    #[tokio::test]
    async fn sends_schema_question_and_zero_temperature() {
        let model = Arc::new(ScriptedModel::new([
            "SELECT \"NAME\" FROM STUDENT ORDER BY \"MARKS\" DESC LIMIT 5",
        ]));
        let generator = QueryGenerator::new(model.clone(), 5);

        let sql = generator
            .generate("  Top 5 students by marks  ", STUDENT_SCHEMA)
            .await
            .unwrap();

        assert!(sql.starts_with("SELECT"));
        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, 0.0);
        assert!(requests[0].messages[0].content.contains(STUDENT_SCHEMA));
        assert!(requests[0].messages[0].content.contains("at most 5 results"));
        assert_eq!(
            requests[0].messages[1].content,
            "Question: Top 5 students by marks\nSQLQuery: "
        );
    }

    #[tokio::test]
    async fn empty_question_makes_no_call() {
        let model = Arc::new(ScriptedModel::default());
        let generator = QueryGenerator::new(model.clone(), 5);

        let err = generator.generate("   ", STUDENT_SCHEMA).await.unwrap_err();

        assert!(matches!(err, QueryError::EmptyQuestion));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn blank_model_output_is_a_generation_error() {
        let model = Arc::new(ScriptedModel::new(["  \n "]));
        let generator = QueryGenerator::new(model, 5);

        let err = generator
            .generate("How many students?", STUDENT_SCHEMA)
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::Generation(_)));
    }

    #[test]
    fn correction_prompt_embeds_sql_error_and_question() {
        let prompt = correction_prompt(
            "SELECT FOO FROM STUDENT",
            "no such column: FOO",
            "Who has the best marks?",
        );
        assert_eq!(
            prompt,
            "The following SQL query failed: SELECT FOO FROM STUDENT\n\
             Error: no such column: FOO\n\
             Regenerate a correct SQL query for the question: Who has the best marks?"
        );
    }
}
