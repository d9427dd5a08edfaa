use async_trait::async_trait;
use chrono::NaiveDate;

use crate::aircraft::Aircraft;
use crate::voucher::Voucher;

/// Repository trait for voucher persistence. One record per flight/date.
#[async_trait]
pub trait VoucherStore: Send + Sync {
    async fn exists(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Insert the voucher only if no record exists for its flight/date.
    /// Returns false when a concurrent writer got there first.
    async fn insert_new(
        &self,
        voucher: &Voucher,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn fetch_seats(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
    ) -> Result<Option<[String; 3]>, Box<dyn std::error::Error + Send + Sync>>;

    /// Replace the stored seats, but only while they still equal `expected`.
    /// Returns false when the record changed underneath the caller (or is gone).
    async fn overwrite_seats(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
        aircraft: Aircraft,
        expected: &[String; 3],
        seats: &[String; 3],
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
