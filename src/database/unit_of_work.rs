use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};

use super::journal::Journal;

/// Run `work` inside one transaction: committed when it returns `Ok`, rolled
/// back otherwise.
pub fn in_transaction<T>(
    conn: &mut Connection,
    journal: &Journal,
    work: impl FnOnce(&Transaction) -> Result<T>,
) -> Result<T> {
    let tx = conn.transaction().context("Failed to open transaction")?;
    journal.record("BEGIN".to_string());

    match work(&tx) {
        Ok(value) => {
            tx.commit().context("Failed to commit transaction")?;
            journal.record("COMMIT".to_string());
            Ok(value)
        }
        Err(error) => {
            journal.record("ROLLBACK".to_string());
            tx.rollback().context("Failed to roll back transaction")?;
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::journal::execute;
    use crate::database::{create_memory_pool, ensure_schema, get_connection};

    fn referees(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM referees", [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn test_failure_rolls_back_everything() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        ensure_schema(&conn).unwrap();
        let journal = Journal::new();

        let result: Result<()> = in_transaction(&mut conn, &journal, |tx| {
            execute(tx, &journal, "INSERT INTO referees (name) VALUES (?1)", rusqlite::params!["Ana"])?;
            anyhow::bail!("second statement failed")
        });

        assert!(result.is_err());
        assert_eq!(referees(&conn), 0);
        assert!(journal.render().ends_with("ROLLBACK;\n"));

        in_transaction(&mut conn, &journal, |tx| {
            execute(tx, &journal, "INSERT INTO referees (name) VALUES (?1)", rusqlite::params!["Ana"])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(referees(&conn), 1);
    }
}
