use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use persistence::{
    AuditFields, Entity, Intent, Mutation, Result, StoreError, StoreWriter, validate_batch,
};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use super::OrderStore;
use crate::order::{Order, OrderQuery};

const COLUMNS: &str = "id, user_name, first_name, last_name, email_address, address_line, country, \
     total_price, created_date, created_by, last_modified_date, last_modified_by, deleted";

/// PostgreSQL-backed order store.
///
/// Every batch runs in one transaction; identifiers come from the
/// `orders.id` sequence.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let draft = Order::builder()
            .user_name(row.try_get::<String, _>("user_name")?)
            .first_name(row.try_get::<String, _>("first_name")?)
            .last_name(row.try_get::<String, _>("last_name")?)
            .email_address(row.try_get::<String, _>("email_address")?)
            .address_line(row.try_get::<String, _>("address_line")?)
            .country(row.try_get::<String, _>("country")?)
            .total_price(row.try_get::<Decimal, _>("total_price")?)
            .build();

        let audit = AuditFields::restore(
            row.try_get::<Option<DateTime<Utc>>, _>("created_date")?,
            row.try_get("created_by")?,
            row.try_get::<Option<DateTime<Utc>>, _>("last_modified_date")?,
            row.try_get("last_modified_by")?,
            row.try_get("deleted")?,
        );

        Ok(Order::restore(
            OrderId::new(row.try_get("id")?),
            draft,
            audit,
        ))
    }

    /// Explains why an update or delete matched no live row.
    async fn missing(conn: &mut PgConnection, id: OrderId) -> StoreError {
        let deleted: std::result::Result<Option<bool>, sqlx::Error> =
            sqlx::query_scalar("SELECT deleted FROM orders WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(conn)
                .await;

        match deleted {
            Ok(Some(true)) => StoreError::Tombstoned {
                entity_type: Order::entity_type(),
                id: id.to_string(),
            },
            Ok(_) => StoreError::NotFound {
                entity_type: Order::entity_type(),
                id: id.to_string(),
            },
            Err(e) => StoreError::Database(e),
        }
    }

    async fn insert(conn: &mut PgConnection, order: &Order) -> Result<PgRow> {
        let sql = format!(
            r#"
            INSERT INTO orders (user_name, first_name, last_name, email_address, address_line,
                                country, total_price, created_date, created_by,
                                last_modified_date, last_modified_by, deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, NULL, FALSE)
            RETURNING {COLUMNS}
            "#
        );

        Ok(sqlx::query(&sql)
            .bind(order.user_name())
            .bind(order.first_name())
            .bind(order.last_name())
            .bind(order.email_address())
            .bind(order.address_line())
            .bind(order.country())
            .bind(order.total_price())
            .bind(order.created_date())
            .bind(order.created_by())
            .fetch_one(conn)
            .await?)
    }

    async fn replace(conn: &mut PgConnection, id: OrderId, order: &Order) -> Result<PgRow> {
        let sql = format!(
            r#"
            UPDATE orders SET
                user_name = $2, first_name = $3, last_name = $4, email_address = $5,
                address_line = $6, country = $7, total_price = $8,
                last_modified_date = $9, last_modified_by = $10
            WHERE id = $1 AND NOT deleted
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .bind(order.user_name())
            .bind(order.first_name())
            .bind(order.last_name())
            .bind(order.email_address())
            .bind(order.address_line())
            .bind(order.country())
            .bind(order.total_price())
            .bind(order.last_modified_date())
            .bind(order.last_modified_by())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(row),
            None => Err(Self::missing(conn, id).await),
        }
    }

    async fn tombstone(conn: &mut PgConnection, id: OrderId, order: &Order) -> Result<PgRow> {
        let sql = format!(
            r#"
            UPDATE orders SET
                deleted = TRUE, last_modified_date = $2, last_modified_by = $3
            WHERE id = $1 AND NOT deleted
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .bind(order.last_modified_date())
            .bind(order.last_modified_by())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(row),
            None => Err(Self::missing(conn, id).await),
        }
    }
}

#[async_trait]
impl StoreWriter for PostgresOrderStore {
    type Entity = Order;

    async fn write(&self, batch: Vec<Mutation<Order>>) -> Result<Vec<Order>> {
        validate_batch(&batch)?;

        // Start a transaction; dropping it on error rolls the batch back
        let mut tx = self.pool.begin().await?;

        let mut written = Vec::with_capacity(batch.len());
        for mutation in &batch {
            let order = mutation.entity();
            let row = match (mutation.intent(), order.id()) {
                (Intent::Create, _) => Self::insert(&mut *tx, order).await?,
                (Intent::Update, Some(id)) => Self::replace(&mut *tx, id, order).await?,
                (Intent::Delete, Some(id)) => Self::tombstone(&mut *tx, id, order).await?,
                (intent, None) => {
                    return Err(StoreError::InvalidMutation(format!(
                        "cannot {intent} an order without an identifier"
                    )));
                }
            };
            written.push(Self::row_to_order(row)?);
        }

        tx.commit().await?;
        Ok(written)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>> {
        let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        let row: Option<PgRow> = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn query(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT {COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if !query.include_deleted {
            sql.push_str(" AND NOT deleted");
        }
        if query.user_name.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND user_name = ${param_count}"));
        }
        if query.email_address.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND email_address = ${param_count}"));
        }
        if query.country.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND country = ${param_count}"));
        }

        sql.push_str(" ORDER BY id ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(user_name) = query.user_name {
            sqlx_query = sqlx_query.bind(user_name);
        }
        if let Some(email_address) = query.email_address {
            sqlx_query = sqlx_query.bind(email_address);
        }
        if let Some(country) = query.country {
            sqlx_query = sqlx_query.bind(country);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(i64::try_from(offset).unwrap_or(i64::MAX));
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
