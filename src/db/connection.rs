use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Postgres, Row, TypeInfo, ValueRef};

use super::{Database, ResultTable, SqlArg};
use crate::error::TarmacError;

/// Owns the single database session for the lifetime of the process.
pub struct PgHarness {
    pool: PgPool,
}

impl PgHarness {
    pub async fn connect(
        host: &str,
        port: u16,
        dbname: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, TarmacError> {
        let url = if password.is_empty() {
            format!("postgres://{user}@{host}:{port}/{dbname}")
        } else {
            format!("postgres://{user}:{password}@{host}:{port}/{dbname}")
        };

        // One session, one in-flight statement at a time.
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .map_err(|e| TarmacError::Connection {
                message: e.to_string(),
            })?;

        tracing::info!(host, port, dbname, user, "connected");
        Ok(Self { pool })
    }

    /// Best-effort close at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl Database for PgHarness {
    async fn execute_update(&self, sql: &str, args: Vec<SqlArg>) -> Result<(), TarmacError> {
        tracing::debug!(sql, "executing update");
        bind_args(sqlx::query(sql), args)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query(&self, sql: &str, args: Vec<SqlArg>) -> Result<ResultTable, TarmacError> {
        tracing::debug!(sql, "executing query");
        let rows = bind_args(sqlx::query(sql), args)
            .fetch_all(&self.pool)
            .await?;
        if rows.is_empty() {
            return Ok(ResultTable::empty());
        }

        let columns: Vec<String> = rows[0]
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let data: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                (0..columns.len())
                    .map(|idx| extract_pg_value(row, idx))
                    .collect()
            })
            .collect();

        Ok(ResultTable {
            columns,
            rows: data,
        })
    }

    async fn current_sequence_value(&self, sequence: &str) -> Result<i64, TarmacError> {
        let row = sqlx::query("SELECT currval($1::regclass)")
            .bind(sequence)
            .fetch_optional(&self.pool)
            .await;
        match row {
            Ok(Some(r)) => Ok(r.try_get::<i64, _>(0).unwrap_or(-1)),
            Ok(None) => Ok(-1),
            Err(e) => {
                // Matches the reference behavior: a missing or unread
                // sequence yields the sentinel rather than an error.
                tracing::debug!(sequence, error = %e, "sequence value unavailable");
                Ok(-1)
            }
        }
    }
}

fn bind_args(
    query: sqlx::query::Query<'_, Postgres, PgArguments>,
    args: Vec<SqlArg>,
) -> sqlx::query::Query<'_, Postgres, PgArguments> {
    let mut query = query;
    for arg in args {
        query = match arg {
            SqlArg::Int(v) => query.bind(v),
            SqlArg::Text(v) => query.bind(v),
        };
    }
    query
}

fn extract_pg_value(row: &PgRow, idx: usize) -> String {
    let value_ref = row.try_get_raw(idx).ok();

    if let Some(vr) = value_ref {
        if vr.is_null() {
            return "NULL".to_string();
        }

        let type_info = vr.type_info().clone();
        let type_name = type_info.name();

        match type_name {
            "BOOL" => {
                if let Ok(v) = row.try_get::<bool, _>(idx) {
                    return v.to_string();
                }
            }
            "INT2" | "SMALLINT" | "SMALLSERIAL" => {
                if let Ok(v) = row.try_get::<i16, _>(idx) {
                    return v.to_string();
                }
            }
            "INT4" | "INT" | "INTEGER" | "SERIAL" => {
                if let Ok(v) = row.try_get::<i32, _>(idx) {
                    return v.to_string();
                }
            }
            "INT8" | "BIGINT" | "BIGSERIAL" => {
                if let Ok(v) = row.try_get::<i64, _>(idx) {
                    return v.to_string();
                }
            }
            "FLOAT4" | "REAL" => {
                if let Ok(v) = row.try_get::<f32, _>(idx) {
                    return v.to_string();
                }
            }
            "FLOAT8" | "DOUBLE PRECISION" => {
                if let Ok(v) = row.try_get::<f64, _>(idx) {
                    return v.to_string();
                }
            }
            "NUMERIC" | "DECIMAL" => {
                if let Ok(v) = row.try_get::<sqlx::types::BigDecimal, _>(idx) {
                    return v.to_string();
                }
                if let Ok(v) = row.try_get::<f64, _>(idx) {
                    return v.to_string();
                }
            }
            "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
                if let Ok(v) = row.try_get::<String, _>(idx) {
                    return v;
                }
            }
            "UUID" => {
                if let Ok(v) = row.try_get::<sqlx::types::Uuid, _>(idx) {
                    return v.to_string();
                }
            }
            "DATE" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveDate, _>(idx) {
                    return v.to_string();
                }
            }
            "TIME" | "TIMETZ" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveTime, _>(idx) {
                    return v.to_string();
                }
            }
            "TIMESTAMP" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveDateTime, _>(idx) {
                    return v.to_string();
                }
            }
            "TIMESTAMPTZ" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::DateTime<sqlx::types::chrono::Utc>, _>(idx) {
                    return v.to_string();
                }
            }
            "JSON" | "JSONB" => {
                if let Ok(v) = row.try_get::<sqlx::types::JsonValue, _>(idx) {
                    return v.to_string();
                }
            }
            "BYTEA" => {
                if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
                    return format!("\\x{}", hex::encode(v));
                }
            }
            "INET" | "CIDR" => {
                if let Ok(v) = row.try_get::<String, _>(idx) {
                    return v;
                }
            }
            _ => {}
        }
    }

    row.try_get::<String, _>(idx)
        .or_else(|_| row.try_get::<i64, _>(idx).map(|v| v.to_string()))
        .or_else(|_| row.try_get::<i32, _>(idx).map(|v| v.to_string()))
        .or_else(|_| row.try_get::<f64, _>(idx).map(|v| v.to_string()))
        .or_else(|_| row.try_get::<bool, _>(idx).map(|v| v.to_string()))
        .unwrap_or_else(|_| "NULL".to_string())
}
