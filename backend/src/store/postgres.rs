//! PostgreSQL record store

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{
    Bill, BillLine, CreateRouteInput, CreateVendorInput, Item, ItemInput, NewBill, Route, Vendor,
};

use super::RecordStore;
use crate::error::{AppError, AppResult};

type RouteRow = (Uuid, String, Option<String>, DateTime<Utc>);

/// Vendor columns followed by its route's name, description and created_at
type VendorRow = (
    Uuid,
    String,
    Option<String>,
    Option<String>,
    Uuid,
    DateTime<Utc>,
    String,
    Option<String>,
    DateTime<Utc>,
);

type ItemRow = (Uuid, String, String, Decimal, bool, Option<Decimal>, DateTime<Utc>);

/// Bill columns followed by the vendor and route columns
type BillRow = (
    Uuid,
    Uuid,
    DateTime<Utc>,
    Decimal,
    Decimal,
    DateTime<Utc>,
    String,
    Option<String>,
    Option<String>,
    Uuid,
    DateTime<Utc>,
    String,
    Option<String>,
    DateTime<Utc>,
);

/// Line columns followed by the item columns (without the repeated id)
type LineRow = (
    Uuid,
    Uuid,
    Uuid,
    Decimal,
    Decimal,
    String,
    String,
    Decimal,
    bool,
    Option<Decimal>,
    DateTime<Utc>,
);

const BILL_COLUMNS: &str = r#"
    SELECT b.id, b.vendor_id, b.date, b.total, b.gst_total, b.created_at,
           v.name, v.contact, v.address, v.route_id, v.created_at,
           r.name, r.description, r.created_at
    FROM bills b
    JOIN vendors v ON v.id = b.vendor_id
    JOIN routes r ON r.id = v.route_id
"#;

const ITEM_COLUMNS: &str =
    "SELECT id, name_en, name_gu, rate, has_gst, gst_percentage, created_at FROM items";

fn route_from_row(r: RouteRow) -> Route {
    Route {
        id: r.0,
        name: r.1,
        description: r.2,
        created_at: r.3,
    }
}

fn vendor_from_row(r: VendorRow) -> Vendor {
    Vendor {
        id: r.0,
        name: r.1,
        contact: r.2,
        address: r.3,
        route_id: r.4,
        created_at: r.5,
        route: Some(Route {
            id: r.4,
            name: r.6,
            description: r.7,
            created_at: r.8,
        }),
    }
}

fn item_from_row(r: ItemRow) -> Item {
    Item {
        id: r.0,
        name_en: r.1,
        name_gu: r.2,
        rate: r.3,
        has_gst: r.4,
        gst_percentage: r.5,
        created_at: r.6,
    }
}

fn bill_from_row(r: BillRow, lines: Vec<BillLine>) -> Bill {
    Bill {
        id: r.0,
        vendor_id: r.1,
        date: r.2,
        total: r.3,
        gst_total: r.4,
        created_at: r.5,
        vendor: Some(vendor_from_row((r.1, r.6, r.7, r.8, r.9, r.10, r.11, r.12, r.13))),
        lines,
    }
}

fn line_from_row(r: LineRow) -> BillLine {
    BillLine {
        id: r.0,
        bill_id: r.1,
        item_id: r.2,
        quantity: r.3,
        rate: r.4,
        item: Some(Item {
            id: r.2,
            name_en: r.5,
            name_gu: r.6,
            rate: r.7,
            has_gst: r.8,
            gst_percentage: r.9,
            created_at: r.10,
        }),
    }
}

/// Record store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Lines of the given bills with their items, in entry order
    async fn load_lines(&self, bill_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<BillLine>>> {
        let rows = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT bi.id, bi.bill_id, bi.item_id, bi.quantity, bi.rate,
                   i.name_en, i.name_gu, i.rate, i.has_gst, i.gst_percentage, i.created_at
            FROM bill_items bi
            JOIN items i ON i.id = bi.item_id
            WHERE bi.bill_id = ANY($1)
            ORDER BY bi.bill_id, bi.position
            "#,
        )
        .bind(bill_ids)
        .fetch_all(&self.db)
        .await?;

        let mut lines: HashMap<Uuid, Vec<BillLine>> = HashMap::new();
        for row in rows {
            let line = line_from_row(row);
            lines.entry(line.bill_id).or_default().push(line);
        }
        Ok(lines)
    }
}

#[async_trait]
impl RecordStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn create_route(&self, input: CreateRouteInput) -> AppResult<Route> {
        let row = sqlx::query_as::<_, RouteRow>(
            r#"
            INSERT INTO routes (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(route_from_row(row))
    }

    async fn list_routes(&self) -> AppResult<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>(
            "SELECT id, name, description, created_at FROM routes ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(route_from_row).collect())
    }

    async fn create_vendor(&self, input: CreateVendorInput) -> AppResult<Vendor> {
        let route = sqlx::query_as::<_, RouteRow>(
            "SELECT id, name, description, created_at FROM routes WHERE id = $1",
        )
        .bind(input.route_id)
        .fetch_optional(&self.db)
        .await?
        .map(route_from_row)
        .ok_or_else(|| AppError::NotFound("Route".to_string()))?;

        let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO vendors (id, name, contact, address, route_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.address)
        .bind(input.route_id)
        .fetch_one(&self.db)
        .await?;

        Ok(Vendor {
            id: row.0,
            name: input.name,
            contact: input.contact,
            address: input.address,
            route_id: input.route_id,
            created_at: row.1,
            route: Some(route),
        })
    }

    async fn list_vendors(&self, route_id: Option<Uuid>) -> AppResult<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, VendorRow>(
            r#"
            SELECT v.id, v.name, v.contact, v.address, v.route_id, v.created_at,
                   r.name, r.description, r.created_at
            FROM vendors v
            JOIN routes r ON r.id = v.route_id
            WHERE ($1::uuid IS NULL OR v.route_id = $1)
            ORDER BY v.name ASC
            "#,
        )
        .bind(route_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(vendor_from_row).collect())
    }

    async fn create_item(&self, input: ItemInput) -> AppResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (id, name_en, name_gu, rate, has_gst, gst_percentage)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name_en, name_gu, rate, has_gst, gst_percentage, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name_en)
        .bind(&input.name_gu)
        .bind(input.rate)
        .bind(input.has_gst)
        .bind(input.gst_percentage)
        .fetch_one(&self.db)
        .await?;

        Ok(item_from_row(row))
    }

    async fn list_items(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!("{} ORDER BY name_en ASC", ITEM_COLUMNS))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(item_from_row).collect())
    }

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!("{} WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(item_from_row))
    }

    async fn update_item(&self, id: Uuid, input: ItemInput) -> AppResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items
            SET name_en = $2, name_gu = $3, rate = $4, has_gst = $5, gst_percentage = $6
            WHERE id = $1
            RETURNING id, name_en, name_gu, rate, has_gst, gst_percentage, created_at
            "#,
        )
        .bind(id)
        .bind(&input.name_en)
        .bind(&input.name_gu)
        .bind(input.rate)
        .bind(input.has_gst)
        .bind(input.gst_percentage)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(item_from_row(row))
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<Item> {
        let mut tx = self.db.begin().await?;

        let item = sqlx::query_as::<_, ItemRow>(&format!("{} WHERE id = $1 FOR UPDATE", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .map(item_from_row)
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        sqlx::query("DELETE FROM bill_items WHERE item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(item)
    }

    async fn create_bill(&self, bill: NewBill) -> AppResult<Bill> {
        let mut tx = self.db.begin().await?;

        let vendor_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vendors WHERE id = $1)")
                .bind(bill.vendor_id)
                .fetch_one(&mut *tx)
                .await?;
        if !vendor_exists {
            return Err(AppError::NotFound("Vendor".to_string()));
        }

        let item_ids: Vec<Uuid> = bill
            .lines
            .iter()
            .map(|line| line.item_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE id = ANY($1)")
            .bind(&item_ids)
            .fetch_one(&mut *tx)
            .await?;
        if found != item_ids.len() as i64 {
            return Err(AppError::NotFound("Item".to_string()));
        }

        let bill_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO bills (id, vendor_id, date, total, gst_total)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(bill_id)
        .bind(bill.vendor_id)
        .bind(bill.date)
        .bind(bill.total)
        .bind(bill.gst_total)
        .execute(&mut *tx)
        .await?;

        for (position, line) in bill.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO bill_items (id, bill_id, item_id, position, quantity, rate)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(bill_id)
            .bind(line.item_id)
            .bind(position as i32)
            .bind(line.quantity)
            .bind(line.rate)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_bill(bill_id)
            .await?
            .ok_or_else(|| AppError::Internal("Bill missing after insert".to_string()))
    }

    async fn list_bills(&self) -> AppResult<Vec<Bill>> {
        let rows = sqlx::query_as::<_, BillRow>(&format!(
            "{} ORDER BY b.date DESC",
            BILL_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.0).collect();
        let mut lines = self.load_lines(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let bill_lines = lines.remove(&row.0).unwrap_or_default();
                bill_from_row(row, bill_lines)
            })
            .collect())
    }

    async fn get_bill(&self, id: Uuid) -> AppResult<Option<Bill>> {
        let row = sqlx::query_as::<_, BillRow>(&format!("{} WHERE b.id = $1", BILL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut lines = self.load_lines(&[id]).await?;
        let bill_lines = lines.remove(&id).unwrap_or_default();
        Ok(Some(bill_from_row(row, bill_lines)))
    }

    async fn delete_bill(&self, id: Uuid) -> AppResult<Bill> {
        let bill = self
            .get_bill(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bill".to_string()))?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM bill_items WHERE bill_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM bills WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Bill".to_string()));
        }

        tx.commit().await?;
        Ok(bill)
    }
}
