use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create missing tables; existing data is left alone
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    run_script(conn, include_str!("schema.sql"))?;
    log::info!("Database schema is in place");
    Ok(())
}

/// Drop every table and recreate the schema
pub fn reset_database(conn: &Connection) -> Result<()> {
    run_script(conn, include_str!("drop.sql"))?;
    run_script(conn, include_str!("schema.sql"))?;
    log::info!("Database schema reset successfully");
    Ok(())
}

fn run_script(conn: &Connection, script: &str) -> Result<()> {
    let statements = split_sql_statements(script);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement).with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &Connection, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection};

    #[test]
    fn test_schema_is_idempotent_and_resettable() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();

        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO referees (name) VALUES ('Ana')", []).unwrap();
        ensure_schema(&conn).unwrap();

        let kept: i64 = conn.query_row("SELECT COUNT(*) FROM referees", [], |r| r.get(0)).unwrap();
        assert_eq!(kept, 1);

        reset_database(&conn).unwrap();
        let after_reset: i64 = conn.query_row("SELECT COUNT(*) FROM referees", [], |r| r.get(0)).unwrap();
        assert_eq!(after_reset, 0);
    }

    #[test]
    fn test_split_statements() {
        assert_eq!(split_sql_statements("A; ;B;"), vec!["A", "B"]);
    }
}
