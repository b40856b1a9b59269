use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::tenant::{Tenant, TenantStatus},
    use_cases::host_resolver::TenantRepo,
};

// The LEFT JOIN restricts custom_domains to `active`, so `custom_domain` is
// populated only while the binding is live.
const SELECT_TENANT: &str = r#"
    SELECT t.id, t.slug, t.status, cd.domain AS custom_domain
    FROM tenants t
    LEFT JOIN custom_domains cd ON cd.tenant_id = t.id AND cd.status = 'active'
"#;

fn row_to_tenant(row: sqlx::postgres::PgRow) -> Tenant {
    Tenant {
        id: row.get("id"),
        slug: row.get("slug"),
        status: TenantStatus::from_str(row.get("status")),
        custom_domain: row.get("custom_domain"),
    }
}

#[async_trait]
impl TenantRepo for PostgresPersistence {
    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>> {
        let row = sqlx::query(&format!("{SELECT_TENANT} WHERE lower(t.slug) = lower($1)"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_tenant))
    }

    async fn get_by_custom_domain(&self, domain: &str) -> AppResult<Option<Tenant>> {
        // INNER semantics via the WHERE clause: non-active bindings resolve
        // as not-found, never exposing partial state to visitors.
        let row = sqlx::query(&format!("{SELECT_TENANT} WHERE cd.domain = $1"))
            .bind(domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_tenant))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        let row = sqlx::query(&format!("{SELECT_TENANT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_tenant))
    }
}
