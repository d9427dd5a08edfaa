use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::aircraft::Aircraft;
use crate::repository::VoucherStore;
use crate::voucher::Voucher;

/// In-memory voucher store keyed by flight/date. Used by tests and as a
/// stand-in when no database is wired up.
#[derive(Default)]
pub struct MemoryVoucherStore {
    vouchers: Mutex<HashMap<(String, NaiveDate), Voucher>>,
}

impl MemoryVoucherStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoucherStore for MemoryVoucherStore {
    async fn exists(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if flight_number.is_empty() {
            return Err("flight number and date cannot be empty".into());
        }

        let vouchers = self.vouchers.lock().await;
        Ok(vouchers.contains_key(&(flight_number.to_string(), flight_date)))
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

        let mut vouchers = self.vouchers.lock().await;
        let key = (voucher.flight_number.clone(), voucher.flight_date);
        if vouchers.contains_key(&key) {
            return Ok(false);
        }
        vouchers.insert(key, voucher.clone());
        Ok(true)
    }

    async fn fetch_seats(
        &self,
        flight_number: &str,
        flight_date: NaiveDate,
    ) -> Result<Option<[String; 3]>, Box<dyn std::error::Error + Send + Sync>> {
        let vouchers = self.vouchers.lock().await;
        Ok(vouchers
            .get(&(flight_number.to_string(), flight_date))
            .map(|v| v.seats.clone()))
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

        let mut vouchers = self.vouchers.lock().await;
        match vouchers.get_mut(&(flight_number.to_string(), flight_date)) {
            Some(voucher) if &voucher.seats == expected => {
                voucher.seats = seats.clone();
                voucher.aircraft = aircraft;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
