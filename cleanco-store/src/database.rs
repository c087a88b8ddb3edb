use async_trait::async_trait;
use cleanco_core::document::{ensure_id, id_key, Document};
use cleanco_core::{
    CoreError, CoreResult, DeleteResult, DocumentStore, Filter, FindOptions, InsertOneResult, SortOrder,
    SortSpec,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Document collections kept as JSONB rows in a single `documents` table.
///
/// Equality filters use JSONB containment, and sorting follows Postgres'
/// native JSONB ordering. `seq` is the natural (insertion) order.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn store_error(err: sqlx::Error) -> CoreError {
    CoreError::Store(err.to_string())
}

/// `WHERE` predicate for `filter`, numbering placeholders from `first`.
/// Each condition binds a text key and a JSONB value, in `conditions()` order.
/// A field matches when it equals the value, when it is an array holding the
/// value, or when it is missing and the value is null.
fn filter_sql(filter: &Filter, first: usize) -> (String, usize) {
    let mut next = first;
    let mut clauses = Vec::with_capacity(filter.conditions().len());
    for _ in filter.conditions() {
        let (key, value) = (next, next + 1);
        next += 2;
        clauses.push(format!(
            "(body -> ${key}::text = ${value}::jsonb \
             OR (jsonb_typeof(${value}::jsonb) <> 'array' AND CASE WHEN jsonb_typeof(body -> ${key}::text) = 'array' \
                 THEN EXISTS (SELECT 1 FROM jsonb_array_elements(body -> ${key}::text) AS item WHERE item = ${value}::jsonb) \
                 ELSE false END) \
             OR (body -> ${key}::text IS NULL AND ${value}::jsonb = 'null'::jsonb))"
        ));
    }

    if clauses.is_empty() {
        ("TRUE".to_string(), next)
    } else {
        (clauses.join(" AND "), next)
    }
}

fn find_sql(filter: &Filter, sort: Option<&SortSpec>) -> String {
    let (predicate, mut next) = filter_sql(filter, 2);

    let order_by = match sort {
        Some(spec) => {
            let direction = match spec.order {
                SortOrder::Ascending => "ASC NULLS FIRST",
                SortOrder::Descending => "DESC NULLS LAST",
            };
            let field = next;
            next += 1;
            format!("body -> ${field} {direction}, seq ASC")
        }
        None => "seq ASC".to_string(),
    };
    let (offset, limit) = (next, next + 1);

    format!(
        "SELECT body FROM documents \
         WHERE collection = $1 AND {predicate} \
         ORDER BY {order_by} \
         OFFSET ${offset} LIMIT ${limit}"
    )
}

fn count_sql(filter: &Filter) -> String {
    let (predicate, _) = filter_sql(filter, 2);
    format!("SELECT COUNT(*) FROM documents WHERE collection = $1 AND {predicate}")
}

fn delete_sql(filter: &Filter) -> String {
    let (predicate, _) = filter_sql(filter, 2);
    format!(
        "DELETE FROM documents \
         WHERE (collection, id) IN ( \
             SELECT collection, id FROM documents \
             WHERE collection = $1 AND {predicate} \
             ORDER BY seq ASC \
             LIMIT 1 \
         )"
    )
}

fn to_bind(value: Option<u64>) -> Option<i64> {
    value.map(|v| i64::try_from(v).unwrap_or(i64::MAX))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> CoreResult<Vec<Document>> {
        let sql = find_sql(filter, options.sort.as_ref());

        let mut query = sqlx::query_scalar::<Postgres, Json<Document>>(&sql).bind(collection);
        for (field, value) in filter.conditions() {
            query = query.bind(field.as_str()).bind(Json(value));
        }
        if let Some(sort) = &options.sort {
            query = query.bind(sort.field.as_str());
        }
        let rows = query
            .bind(to_bind(options.skip))
            .bind(to_bind(options.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn count_documents(&self, collection: &str, filter: &Filter) -> CoreResult<u64> {
        let sql = count_sql(filter);

        let mut query = sqlx::query_scalar::<Postgres, i64>(&sql).bind(collection);
        for (field, value) in filter.conditions() {
            query = query.bind(field.as_str()).bind(Json(value));
        }
        let count = query.fetch_one(&self.pool).await.map_err(store_error)?;

        Ok(count.max(0) as u64)
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> CoreResult<InsertOneResult> {
        let id = ensure_id(&mut document);
        let key = id_key(&id);

        let result = sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&key)
            .bind(Json(&document))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(InsertOneResult {
                acknowledged: true,
                inserted_id: id,
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(CoreError::DuplicateKey(key)),
            Err(e) => Err(store_error(e)),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> CoreResult<DeleteResult> {
        let sql = delete_sql(filter);

        let mut query = sqlx::query(&sql).bind(collection);
        for (field, value) in filter.conditions() {
            query = query.bind(field.as_str()).bind(Json(value));
        }
        let result = query.execute(&self.pool).await.map_err(store_error)?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }
}
