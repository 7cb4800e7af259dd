use log::debug;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql};
use std::sync::Mutex;

/// Every statement issued against the store during a run, rendered with its
/// parameters inlined so the file can be replayed by hand.
#[derive(Debug, Default)]
pub struct Journal {
    statements: Mutex<Vec<String>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, statement: String) {
        debug!("SQL: {}", statement);
        self.lock().push(statement);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn render(&self) -> String {
        self.lock().iter().map(|s| format!("{};\n", s)).collect()
    }

    /// Hand back the recorded text and start over
    pub fn take(&self) -> String {
        let rendered = self.render();
        self.lock().clear();
        rendered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.statements.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Run a statement and journal it
pub fn execute(conn: &Connection, journal: &Journal, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<usize> {
    journal.record(render_statement(sql, params));
    conn.execute(sql, params)
}

/// Run a statement returning one value and journal it
pub fn query_value<T: rusqlite::types::FromSql>(
    conn: &Connection,
    journal: &Journal,
    sql: &str,
    params: &[&dyn ToSql],
) -> rusqlite::Result<T> {
    journal.record(render_statement(sql, params));
    conn.query_row(sql, params, |row| row.get(0))
}

/// Inline `?N` placeholders in one pass, so inlined text is never rescanned
pub fn render_statement(sql: &str, params: &[&dyn ToSql]) -> String {
    let sql = collapse_whitespace(sql);
    let mut rendered = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '?' {
            rendered.push(c);
            continue;
        }

        let mut digits = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            digits.push(d);
        }

        let param = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| params.get(idx));
        match param {
            Some(param) => rendered.push_str(&literal(*param)),
            None => {
                rendered.push('?');
                rendered.push_str(&digits);
            }
        }
    }

    rendered
}

fn collapse_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn literal(param: &dyn ToSql) -> String {
    match param.to_sql() {
        Ok(ToSqlOutput::Borrowed(value)) => value_ref_literal(value),
        Ok(ToSqlOutput::Owned(value)) => value_ref_literal(ValueRef::from(&value)),
        Ok(_) => "?".to_string(),
        Err(_) => "NULL".to_string(),
    }
}

fn value_ref_literal(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) => format!("'{}'", String::from_utf8_lossy(bytes).replace('\'', "''")),
        ValueRef::Blob(bytes) => format!("X'{}'", bytes.iter().map(|b| format!("{:02X}", b)).collect::<String>()),
    }
}
