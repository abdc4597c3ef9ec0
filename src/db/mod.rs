mod connection;

pub use connection::*;

use std::io::Write;

use async_trait::async_trait;

use crate::error::TarmacError;

/// A value bound into a `$n` placeholder of a statement.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlArg {
    Int(i64),
    Text(String),
}

/// The three data primitives every handler works against. `PgHarness` is the
/// real implementation; tests substitute an in-memory fake.
#[async_trait]
pub trait Database {
    async fn execute_update(&self, sql: &str, args: Vec<SqlArg>) -> Result<(), TarmacError>;

    async fn query(&self, sql: &str, args: Vec<SqlArg>) -> Result<ResultTable, TarmacError>;

    async fn current_sequence_value(&self, sequence: &str) -> Result<i64, TarmacError>;
}

#[derive(Clone, Debug, Default)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render the table as tab-separated lines: one header line of column
    /// names, then one line per row. A zero-row table produces no output at
    /// all, header included. Returns the number of data rows written.
    pub fn write_tsv<W: Write>(&self, out: &mut W) -> std::io::Result<usize> {
        if self.rows.is_empty() {
            return Ok(0);
        }
        writeln!(out, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            writeln!(out, "{}", row.join("\t"))?;
        }
        Ok(self.rows.len())
    }
}

/// Run a query and print its rows to `out`, returning the row count.
pub async fn query_and_print<D, W>(
    db: &D,
    out: &mut W,
    sql: &str,
    args: Vec<SqlArg>,
) -> Result<usize, TarmacError>
where
    D: Database + Sync + ?Sized,
    W: Write,
{
    let table = db.query(sql, args).await?;
    let printed = table.write_tsv(out)?;
    Ok(printed)
}
