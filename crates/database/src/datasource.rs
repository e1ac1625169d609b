//! Tenant retrieval datasources.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::Datasource;

/// Add a datasource (enabled, read-only) and return its ID.
pub async fn add_datasource(
    pool: &SqlitePool,
    tenant_id: i64,
    name: &str,
    kind: &str,
    url: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO datasources (tenant_id, name, kind, url, enabled, read_only)
        VALUES (?, ?, ?, ?, 1, 1)
        "#,
    )
    .bind(tenant_id)
    .bind(name)
    .bind(kind)
    .bind(url)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Delete a tenant's datasource. Returns whether a row was removed.
pub async fn delete_datasource(pool: &SqlitePool, tenant_id: i64, id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM datasources
        WHERE tenant_id = ? AND id = ?
        "#,
    )
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// List a tenant's datasources, optionally only the enabled ones.
pub async fn list_datasources(
    pool: &SqlitePool,
    tenant_id: i64,
    enabled_only: bool,
) -> Result<Vec<Datasource>> {
    let records = sqlx::query_as::<_, Datasource>(
        r#"
        SELECT id, tenant_id, name, kind, url, headers_json, enabled, read_only
        FROM datasources
        WHERE tenant_id = ? AND (enabled = 1 OR ? = 0)
        ORDER BY id ASC
        "#,
    )
    .bind(tenant_id)
    .bind(enabled_only)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
