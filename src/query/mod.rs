mod error;
mod executor;
mod generator;
mod history;
mod pipeline;
mod sanitizer;
mod store;
mod table;

pub use error::QueryError;
pub use executor::{QueryExecutor, QueryOutcome};
pub use generator::QueryGenerator;
pub use history::ConversationTurn;
pub use pipeline::{QueryPipeline, QueryReport};
pub use sanitizer::SqlSanitizer;
pub use store::SqliteStore;
pub use table::{render_csv, render_markdown};

use crate::{config::Config, llm::LanguageModel};
use std::sync::Arc;

pub fn create_pipeline(
    config: &Config,
    model: Arc<dyn LanguageModel>,
) -> anyhow::Result<QueryPipeline> {
    let store = SqliteStore::open(config.require_database()?)?;
    Ok(QueryPipeline::new(
        QueryGenerator::new(model, config.top_k),
        SqlSanitizer::new(config.strict_sanitizer),
        QueryExecutor::new(Arc::new(store)),
    ))
}
