use crate::query::{
    ConversationTurn, QueryError, QueryOutcome, QueryPipeline, QueryReport, render_csv,
    render_markdown,
};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

const PROMPT: &str = "question> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub fn format_report(report: &QueryReport) -> String {
    let mut out = String::new();

    if let Some(correction) = &report.correction {
        out.push_str("⚠️ Initial query failed. AI auto-corrected the SQL.\n");
        out.push_str(&format!("   failed: {}\n", correction.failed_sql));
        out.push_str(&format!("   error:  {}\n", correction.error));
    }

    out.push_str("✅ Generated SQL Query:\n");
    out.push_str(&report.query.cleaned_sql);
    out.push_str("\n\n");

    match &report.outcome {
        QueryOutcome::Rows(rows) if rows.is_empty() => {
            out.push_str("Query executed successfully, but returned 0 results.");
        }
        QueryOutcome::Rows(rows) => {
            out.push_str(&format!("📊 Query Result ({} rows found):\n", rows.len()));
            out.push_str(&render_markdown(rows));
        }
        QueryOutcome::Executed { rows_affected } => {
            out.push_str(&format!("Statement executed, {} rows affected.", rows_affected));
        }
    }

    out
}

pub fn format_history(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return "No history yet.".to_string();
    }
    turns
        .iter()
        .map(ConversationTurn::format_for_display)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_error(e: &QueryError) -> String {
    match e {
        QueryError::EmptyQuestion => format!("⚠️ {}", e),
        _ => format!("❌ Error Processing Query: {}", e),
    }
}

/// CSV only applies to row results; other outcomes fall back to text.
pub fn render_output(report: &QueryReport, format: OutputFormat) -> Result<String> {
    let output = match (format, &report.outcome) {
        (OutputFormat::Json, _) => format!("{}\n", serde_json::to_string_pretty(report)?),
        (OutputFormat::Csv, QueryOutcome::Rows(rows)) => render_csv(rows),
        _ => format!("{}\n", format_report(report)),
    };
    Ok(output)
}

pub async fn ask(pipeline: &QueryPipeline, question: &str, format: OutputFormat) -> Result<()> {
    let report = pipeline.run(question).await?;
    print!("{}", render_output(&report, format)?);
    Ok(())
}

pub async fn repl(pipeline: &QueryPipeline) -> Result<()> {
    println!("Ask questions about your database. Commands: :history, :schema, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            ":quit" | ":q" | ":exit" => break,
            ":history" => println!("{}", format_history(&pipeline.recent_history().await)),
            ":schema" => match pipeline.table_info().await {
                Ok(info) => println!("{}", info),
                Err(e) => println!("{}", format_error(&e)),
            },
            question => match pipeline.run(question).await {
                Ok(report) => println!("{}\n", format_report(&report)),
                Err(e) => {
                    error!("Query failed: {}", e);
                    println!("{}\n", format_error(&e));
                }
            },
        }
    }

    Ok(())
}
