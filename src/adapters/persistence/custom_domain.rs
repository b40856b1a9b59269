use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::custom_domain::{CustomDomainBinding, CustomDomainStatus},
    use_cases::custom_domain::CustomDomainRepo,
};

const COLUMNS: &str = "id, tenant_id, domain, status, verification_token, \
     verified_at, activated_at, last_checked_at, last_error, created_at, updated_at";

fn row_to_binding(row: sqlx::postgres::PgRow) -> CustomDomainBinding {
    CustomDomainBinding {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        domain: row.get("domain"),
        status: CustomDomainStatus::from_str(row.get("status")),
        verification_token: row.get("verification_token"),
        verified_at: row.get("verified_at"),
        activated_at: row.get("activated_at"),
        last_checked_at: row.get("last_checked_at"),
        last_error: row.get("last_error"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// State transitions are conditional updates keyed on the current status, so
// the database is the single writer lease across server instances. A `None`
// return means the precondition no longer holds.
#[async_trait]
impl CustomDomainRepo for PostgresPersistence {
    async fn create(
        &self,
        tenant_id: Uuid,
        domain: &str,
        token: &str,
    ) -> AppResult<CustomDomainBinding> {
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            r#"
                INSERT INTO custom_domains (id, tenant_id, domain, status, verification_token)
                VALUES ($1, $2, $3, 'pending', $4)
                RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(tenant_id)
        .bind(domain)
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_binding(row))
    }

    async fn get_by_tenant(&self, tenant_id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM custom_domains WHERE tenant_id = $1"
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_binding))
    }

    async fn get_by_domain(&self, domain: &str) -> AppResult<Option<CustomDomainBinding>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM custom_domains WHERE domain = $1"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_binding))
    }

    async fn get_active_by_domain(&self, domain: &str) -> AppResult<Option<CustomDomainBinding>> {
        // Served by the partial index on (domain) WHERE status = 'active';
        // this is the TLS terminator's hot path.
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM custom_domains WHERE domain = $1 AND status = 'active'"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_binding))
    }

    async fn set_verifying(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE custom_domains
                SET status = 'verifying', last_checked_at = CURRENT_TIMESTAMP,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $1 AND status IN ('pending', 'failed', 'verified')
                RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_binding))
    }

    async fn set_verified(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE custom_domains
                SET status = 'verified', verified_at = CURRENT_TIMESTAMP,
                    last_checked_at = CURRENT_TIMESTAMP, last_error = NULL,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $1 AND status = 'verifying'
                RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_binding))
    }

    async fn set_active(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE custom_domains
                SET status = 'active', activated_at = CURRENT_TIMESTAMP,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $1 AND status = 'verified'
                RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_binding))
    }

    async fn set_failed(&self, id: Uuid, error: &str) -> AppResult<Option<CustomDomainBinding>> {
        let row = sqlx::query(&format!(
            r#"
                UPDATE custom_domains
                SET status = 'failed', last_error = $2,
                    last_checked_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
                WHERE id = $1 AND status IN ('verifying', 'active')
                RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(error)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_binding))
    }

    async fn touch_checked(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE custom_domains SET last_checked_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM custom_domains WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn list_verifying(&self) -> AppResult<Vec<CustomDomainBinding>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM custom_domains WHERE status = 'verifying'"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_binding).collect())
    }

    async fn list_active_checked_before(
        &self,
        cutoff: NaiveDateTime,
    ) -> AppResult<Vec<CustomDomainBinding>> {
        let rows = sqlx::query(&format!(
            r#"
                SELECT {COLUMNS} FROM custom_domains
                WHERE status = 'active'
                  AND (last_checked_at IS NULL OR last_checked_at < $1)
            "#
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_binding).collect())
    }
}
