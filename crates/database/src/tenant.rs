//! Tenant configuration storage.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewTenant, Tenant, TenantConfigUpdate};

const TENANT_COLUMNS: &str = "id, name, context, agent_mode, model_name, temperature, rules_md, \
     rules_json, admin_enabled, admin_keyword, admin_password_hash, admin_allow_list";

/// Create a tenant and return its ID.
pub async fn create_tenant(pool: &SqlitePool, tenant: &NewTenant) -> Result<i64> {
    let allow_list =
        serde_json::to_string(&tenant.admin_allow_list).map_err(|source| DatabaseError::Json {
            field: "admin_allow_list",
            source,
        })?;
    let agent_mode = if tenant.agent_mode.is_empty() {
        "ventas"
    } else {
        tenant.agent_mode.as_str()
    };
    let keyword = if tenant.admin_keyword.is_empty() {
        "#admin"
    } else {
        tenant.admin_keyword.as_str()
    };

    let result = sqlx::query(
        r#"
        INSERT INTO tenants (name, context, agent_mode, admin_enabled, admin_keyword, admin_allow_list)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tenant.name)
    .bind(&tenant.context)
    .bind(agent_mode)
    .bind(tenant.admin_enabled)
    .bind(keyword)
    .bind(allow_list)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get a tenant by ID.
pub async fn get_tenant(pool: &SqlitePool, id: i64) -> Result<Tenant> {
    let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?");
    sqlx::query_as::<_, Tenant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Tenant",
            id: id.to_string(),
        })
}

/// Persist the admin-mutable configuration fields in one statement.
pub async fn update_config(pool: &SqlitePool, id: i64, update: &TenantConfigUpdate) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE tenants
        SET agent_mode = ?, model_name = ?, temperature = ?, rules_md = ?, rules_json = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&update.agent_mode)
    .bind(&update.model_name)
    .bind(update.temperature)
    .bind(&update.rules_md)
    .bind(&update.rules_json)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Tenant",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Store a new admin password digest.
pub async fn set_admin_password_hash(pool: &SqlitePool, id: i64, digest: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE tenants
        SET admin_password_hash = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(digest)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Tenant",
            id: id.to_string(),
        });
    }

    Ok(())
}
