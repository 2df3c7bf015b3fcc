use sqlx::PgPool;
use uuid::Uuid;

pub async fn get_seen_domains(
    pool: &PgPool,
    workspace_id: Uuid,
    niche_key: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        select
            domain
        from
            niche_seen
        where
            workspace_id = $1
            and niche_key = $2
        "#,
    )
    .bind(workspace_id)
    .bind(niche_key)
    .fetch_all(pool)
    .await
}

pub async fn upsert_seen_domains(
    pool: &PgPool,
    workspace_id: Uuid,
    niche_key: &str,
    domains: &[String],
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        insert into niche_seen
            (workspace_id, niche_key, domain)
        select $1, $2, domain from unnest (
            $3::text[]
        ) as domain
        on conflict (workspace_id, niche_key, domain) do update set
            last_seen_at = now()
        "#,
    )
    .bind(workspace_id)
    .bind(niche_key)
    .bind(domains)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_saved_company_websites(
    pool: &PgPool,
    workspace_id: Uuid,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        select
            website
        from
            company
        where
            workspace_id = $1
            and saved = true
            and website is not null
        "#,
    )
    .bind(workspace_id)
    .fetch_all(pool)
    .await
}
