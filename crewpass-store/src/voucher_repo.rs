use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::debug;

use crewpass_core::aircraft::Aircraft;
use crewpass_core::repository::VoucherStore;
use crewpass_core::voucher::Voucher;

pub struct PgVoucherStore {
    pool: PgPool,
}

impl PgVoucherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct SeatRow {
    seat1: String,
    seat2: String,
    seat3: String,
}

#[async_trait]
impl VoucherStore for PgVoucherStore {
    async fn exists(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if flight_number.is_empty() {
            return Err("flight number and date cannot be empty".into());
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM vouchers WHERE flight_number = $1 AND flight_date = $2)",
        )
        .bind(flight_number)
        .bind(flight_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_new(
        &self,
        voucher: &Voucher,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if voucher.crew_name.is_empty()
            || voucher.crew_id.is_empty()
            || voucher.flight_number.is_empty()
        {
            return Err("all voucher fields are required".into());
        }

        if voucher.seats.iter().any(|s| s.is_empty()) {
            return Err("all seat assignments are required".into());
        }

        // The unique index on (flight_number, flight_date) makes this an
        // atomic insert-if-absent; zero rows affected means the key is taken.
        let result = sqlx::query(
            r#"
            INSERT INTO vouchers (id, crew_name, crew_id, flight_number, flight_date, aircraft_type, seat1, seat2, seat3, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (flight_number, flight_date) DO NOTHING
            "#,
        )
        .bind(voucher.id)
        .bind(&voucher.crew_name)
        .bind(&voucher.crew_id)
        .bind(&voucher.flight_number)
        .bind(voucher.flight_date)
        .bind(voucher.aircraft.code())
        .bind(&voucher.seats[0])
        .bind(&voucher.seats[1])
        .bind(&voucher.seats[2])
        .bind(voucher.created_at)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() == 1;
        debug!(
            "Insert voucher for {} / {}: inserted={}",
            voucher.flight_number, voucher.flight_date, inserted
        );
        Ok(inserted)
    }

    async fn fetch_seats(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
    ) -> Result<Option<[String; 3]>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, SeatRow>(
            "SELECT seat1, seat2, seat3 FROM vouchers WHERE flight_number = $1 AND flight_date = $2",
        )
        .bind(flight_number)
        .bind(flight_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| [r.seat1, r.seat2, r.seat3]))
    }

    async fn overwrite_seats(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
        aircraft: Aircraft,
        expected: &[String; 3],
        seats: &[String; 3],
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if seats.iter().any(|s| s.is_empty()) {
            return Err("all seat assignments are required".into());
        }

        // Guarded update: only replaces the row while the stored seats still
        // equal `expected`, so a concurrent regeneration cannot be lost.
        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET aircraft_type = $3, seat1 = $4, seat2 = $5, seat3 = $6
            WHERE flight_number = $1 AND flight_date = $2
              AND seat1 = $7 AND seat2 = $8 AND seat3 = $9
            "#,
        )
        .bind(flight_number)
        .bind(flight_date)
        .bind(aircraft.code())
        .bind(&seats[0])
        .bind(&seats[1])
        .bind(&seats[2])
        .bind(&expected[0])
        .bind(&expected[1])
        .bind(&expected[2])
        .execute(&self.pool)
        .await?;

        let swapped = result.rows_affected() == 1;
        debug!(
            "Overwrite seats for {} / {}: swapped={}",
            flight_number, flight_date, swapped
        );
        Ok(swapped)
    }
}
