const FENCE: &str = "```";
const SQL_LABEL: &str = "SQLQuery:";
const RESULT_LABEL: &str = "SQLResult:";

/// Pulls runnable SQL out of raw model output.
///
/// This is a text transform, not a parser. The rules run in order:
///
/// 1. trim whitespace
/// 2. take the interior of the first fenced block tagged `sql`
/// 3. otherwise take the interior of the first fenced block of any kind
/// 4. drop everything up to and including a `SQLQuery:` label, and anything
///    from a following `SQLResult:` label on
/// 5. strict mode only: drop everything before the first `SELECT` and
///    everything from the first `;` on
///
/// Output that is still not valid SQL is left for the executor to reject.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlSanitizer {
    strict: bool,
}

impl SqlSanitizer {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn sanitize(&self, raw: &str) -> String {
        let mut sql = raw.trim();

        if let Some(inner) = tagged_sql_block(sql) {
            sql = inner;
        } else if let Some(inner) = any_fenced_block(sql) {
            sql = inner;
        }

        if let Some(pos) = sql.find(SQL_LABEL) {
            sql = sql[pos + SQL_LABEL.len()..].trim();
            if let Some(end) = sql.find(RESULT_LABEL) {
                sql = sql[..end].trim();
            }
        }

        if self.strict {
            sql = from_first_select(sql);
            if let Some(end) = sql.find(';') {
                sql = sql[..end].trim();
            }
        }

        sql.to_string()
    }
}

fn tagged_sql_block(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(FENCE) {
        let start = search_from + offset + FENCE.len();
        let rest = &text[start..];
        let tagged = rest.get(..3).is_some_and(|tag| tag.eq_ignore_ascii_case("sql"))
            && !rest[3..].starts_with(|c: char| c.is_ascii_alphanumeric());
        if tagged {
            return Some(block_body(&rest[3..]));
        }
        search_from = start;
    }
    None
}

fn any_fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    Some(block_body(&text[start..]))
}

fn block_body(rest: &str) -> &str {
    match rest.find(FENCE) {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

fn from_first_select(sql: &str) -> &str {
    let lower = sql.to_ascii_lowercase();
    match lower.find("select") {
        Some(pos) => sql[pos..].trim(),
        None => sql,
    }
}

/// True when the statement reads rows rather than changing them.
/// Lowercased words at parenthesis depth zero, skipping quoted text.
fn top_level_words(sql: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in sql.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '[' => quote = Some(']'),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && quote.is_none() && (c.is_ascii_alphanumeric() || c == '_') {
            current.push(c.to_ascii_lowercase());
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Whether running `sql` yields a result set: plain and CTE selects,
/// `VALUES`, `EXPLAIN`, reading pragmas, and anything with `RETURNING`.
pub fn returns_rows(sql: &str) -> bool {
    let words = top_level_words(sql);
    let Some(first) = words.first() else {
        return false;
    };
    if words.iter().any(|w| w == "returning") {
        return true;
    }

    match first.as_str() {
        "select" | "values" | "explain" => true,
        "pragma" => !sql.contains('='),
        "with" => words
            .iter()
            .skip(1)
            .find(|w| {
                matches!(
                    w.as_str(),
                    "select" | "values" | "insert" | "update" | "delete" | "replace"
                )
            })
            .is_some_and(|w| w == "select" || w == "values"),
        _ => false,
    }
}
