use std::sync::Arc;

use chrono::NaiveDate;
use rand::thread_rng;
use tracing::info;

use crate::aircraft::{Aircraft, UnknownAircraft};
use crate::repository::VoucherStore;
use crate::selector;
use crate::voucher::{AssignmentRequest, Voucher};
use crate::{VoucherError, VoucherResult};

/// Assignment policy knobs, loaded from configuration.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentRules {
    /// Exclude the currently-held seats from the redraw pool during
    /// regeneration, so a replacement never duplicates a retained seat.
    /// `false` restores the permissive behavior where collisions may occur.
    pub exclude_held_seats: bool,
}

impl Default for AssignmentRules {
    fn default() -> Self {
        Self {
            exclude_held_seats: true,
        }
    }
}

/// Orchestrates voucher issuance and regeneration against a `VoucherStore`.
#[derive(Clone)]
pub struct VoucherEngine {
    store: Arc<dyn VoucherStore>,
    rules: AssignmentRules,
}

impl VoucherEngine {
    pub fn new(store: Arc<dyn VoucherStore>, rules: AssignmentRules) -> Self {
        Self { store, rules }
    }

    /// Report whether a voucher already exists for the flight/date key.
    /// Absence is `false`, never an error. No side effects.
    pub async fn check_exists(&self, flight_number: &str, date: &str) -> VoucherResult<bool> {
        if flight_number.is_empty() || date.is_empty() {
            return Err(VoucherError::BadRequest(
                "Flight number and date are required".to_string(),
            ));
        }

        let flight_date = parse_date(date)?;

        self.store
            .exists(flight_number, flight_date)
            .await
            .map_err(|e| {
                VoucherError::Internal(format!("failed to check voucher existence: {}", e))
            })
    }

    /// Issue a new voucher or regenerate part of an existing one, depending on
    /// `request.is_regenerate`. Returns the resulting seat triple.
    pub async fn generate(&self, request: &AssignmentRequest) -> VoucherResult<[String; 3]> {
        let flight_date = parse_date(&request.date)?;

        if request.is_regenerate {
            self.regenerate(request, flight_date).await
        } else {
            self.issue(request, flight_date).await
        }
    }

    async fn issue(
        &self,
        request: &AssignmentRequest,
        flight_date: NaiveDate,
    ) -> VoucherResult<[String; 3]> {
        let crew_name = request.crew_name.as_deref().unwrap_or("");
        let crew_id = request.crew_id.as_deref().unwrap_or("");
        if crew_name.is_empty()
            || crew_id.is_empty()
            || request.flight_number.is_empty()
            || request.aircraft.is_empty()
        {
            return Err(VoucherError::BadRequest(
                "All fields (name, id, flightNumber, date, aircraft) are required".to_string(),
            ));
        }

        let aircraft: Aircraft = request
            .aircraft
            .parse()
            .map_err(|e: UnknownAircraft| VoucherError::BadRequest(e.to_string()))?;

        let seat_map = aircraft.seat_map();
        let drawn = selector::draw(&mut thread_rng(), &seat_map, 3)
            .map_err(|e| VoucherError::Internal(e.to_string()))?;
        let seats: [String; 3] = drawn.try_into().map_err(|_| {
            VoucherError::Internal("failed to generate required number of seats".to_string())
        })?;

        let voucher = Voucher::new(
            crew_name.to_string(),
            crew_id.to_string(),
            request.flight_number.clone(),
            flight_date,
            aircraft,
            seats,
        );

        let inserted = self
            .store
            .insert_new(&voucher)
            .await
            .map_err(|e| VoucherError::Internal(format!("failed to create voucher: {}", e)))?;
        if !inserted {
            return Err(VoucherError::Conflict(
                "vouchers already exist for this flight date".to_string(),
            ));
        }

        info!(
            "Issued voucher {} for flight {} on {}: {:?}",
            voucher.id, voucher.flight_number, voucher.flight_date, voucher.seats
        );
        Ok(voucher.seats)
    }

    async fn regenerate(
        &self,
        request: &AssignmentRequest,
        flight_date: NaiveDate,
    ) -> VoucherResult<[String; 3]> {
        let aircraft: Aircraft = request
            .aircraft
            .parse()
            .map_err(|e: UnknownAircraft| VoucherError::BadRequest(e.to_string()))?;

        let current = self
            .store
            .fetch_seats(&request.flight_number, flight_date)
            .await
            .map_err(|e| VoucherError::Internal(format!("failed to fetch current seats: {}", e)))?
            .ok_or_else(|| VoucherError::NotFound("seats not found".to_string()))?;

        let seat_map = aircraft.seat_map();
        let mut seats = current.clone();

        for label in &request.updated_seats {
            // First position holding this label; labels not currently held
            // are ignored.
            let position = match seats.iter().position(|s| s == label) {
                Some(position) => position,
                None => continue,
            };

            let pool: Vec<String> = if self.rules.exclude_held_seats {
                seat_map
                    .iter()
                    .filter(|s| !seats.contains(*s))
                    .cloned()
                    .collect()
            } else {
                seat_map.clone()
            };

            // ThreadRng is not Send; a binding held across the store await
            // below would make this future unspawnable.
            seats[position] = selector::draw_one(&mut thread_rng(), &pool)
                .map_err(|e| VoucherError::Internal(e.to_string()))?;
        }

        // Overwrite succeeds only while the stored seats still match what was
        // fetched above; a concurrent regeneration in between surfaces as a
        // conflict rather than a lost update.
        let swapped = self
            .store
            .overwrite_seats(&request.flight_number, flight_date, aircraft, &current, &seats)
            .await
            .map_err(|e| VoucherError::Internal(format!("failed to update voucher: {}", e)))?;
        if !swapped {
            return Err(VoucherError::Conflict(
                "voucher seats changed concurrently, please retry".to_string(),
            ));
        }

        info!(
            "Regenerated seats for flight {} on {}: {:?} -> {:?}",
            request.flight_number, flight_date, current, seats
        );
        Ok(seats)
    }
}

fn parse_date(date: &str) -> VoucherResult<NaiveDate> {
    let invalid =
        || VoucherError::BadRequest("invalid date format, expected YYYY-MM-DD".to_string());

    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
    // chrono accepts unpadded month and day; require the exact
    // zero-padded form.
    if parsed.format("%Y-%m-%d").to_string() != date {
        return Err(invalid());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVoucherStore;

    fn engine_with_store(rules: AssignmentRules) -> (VoucherEngine, Arc<MemoryVoucherStore>) {
        let store = Arc::new(MemoryVoucherStore::new());
        (VoucherEngine::new(store.clone(), rules), store)
    }

    fn issue_request() -> AssignmentRequest {
        AssignmentRequest {
            crew_name: Some("Dana Reyes".to_string()),
            crew_id: Some("CR-1042".to_string()),
            flight_number: "XY123".to_string(),
            date: "2024-03-15".to_string(),
            aircraft: "ATR".to_string(),
            is_regenerate: false,
            updated_seats: vec![],
        }
    }

    /// Put a voucher with known seats into the store, bypassing the engine.
    async fn seed_voucher(store: &MemoryVoucherStore, seats: [&str; 3]) -> NaiveDate {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let voucher = Voucher::new(
            "Dana Reyes".to_string(),
            "CR-1042".to_string(),
            "XY123".to_string(),
            date,
            Aircraft::Atr,
            seats.map(String::from),
        );
        assert!(store.insert_new(&voucher).await.unwrap());
        date
    }

    #[tokio::test]
    async fn test_issue_returns_three_distinct_seats_from_map() {
        let (engine, _) = engine_with_store(AssignmentRules::default());

        let seats = engine.generate(&issue_request()).await.unwrap();

        let map = Aircraft::Atr.seat_map();
        assert!(seats.iter().all(|s| map.contains(s)));
        assert_ne!(seats[0], seats[1]);
        assert_ne!(seats[0], seats[2]);
        assert_ne!(seats[1], seats[2]);

        assert!(engine.check_exists("XY123", "2024-03-15").await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_twice_conflicts_and_keeps_original_seats() {
        let (engine, store) = engine_with_store(AssignmentRules::default());

        let first = engine.generate(&issue_request()).await.unwrap();
        let err = engine.generate(&issue_request()).await.unwrap_err();
        assert!(matches!(err, VoucherError::Conflict(_)));
        assert_eq!(err.to_string(), "vouchers already exist for this flight date");

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let stored = store.fetch_seats("XY123", date).await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_issue_requires_all_fields() {
        let (engine, _) = engine_with_store(AssignmentRules::default());

        let mut request = issue_request();
        request.crew_name = None;
        let err = engine.generate(&request).await.unwrap_err();
        assert!(matches!(err, VoucherError::BadRequest(_)));
        assert_eq!(
            err.to_string(),
            "All fields (name, id, flightNumber, date, aircraft) are required"
        );

        let mut request = issue_request();
        request.aircraft = String::new();
        let err = engine.generate(&request).await.unwrap_err();
        assert!(matches!(err, VoucherError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_check_exists_requires_flight_number_and_date() {
        let (engine, _) = engine_with_store(AssignmentRules::default());

        let err = engine.check_exists("", "2024-03-15").await.unwrap_err();
        assert_eq!(err.to_string(), "Flight number and date are required");

        let err = engine.check_exists("XY123", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Flight number and date are required");

        assert!(!engine.check_exists("XY123", "2024-03-15").await.unwrap());
    }

    #[tokio::test]
    async fn test_date_validation() {
        let (engine, _) = engine_with_store(AssignmentRules::default());

        let err = engine.check_exists("XY123", "2024-13-40").await.unwrap_err();
        assert!(matches!(err, VoucherError::BadRequest(_)));
        assert_eq!(err.to_string(), "invalid date format, expected YYYY-MM-DD");

        // Unpadded month or day is not the documented shape.
        let err = engine.check_exists("XY123", "2024-3-15").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid date format, expected YYYY-MM-DD");

        let err = engine.check_exists("XY123", "2024-03-5").await.unwrap_err();
        assert!(matches!(err, VoucherError::BadRequest(_)));

        let mut request = issue_request();
        request.date = "2024-13-40".to_string();
        let err = engine.generate(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid date format, expected YYYY-MM-DD");

        let mut request = issue_request();
        request.date = "2024-3-15".to_string();
        let err = engine.generate(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid date format, expected YYYY-MM-DD");

        assert!(!engine.check_exists("XY123", "2024-03-15").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_aircraft_rejected_on_both_paths() {
        let (engine, store) = engine_with_store(AssignmentRules::default());

        let mut request = issue_request();
        request.aircraft = "Cessna".to_string();
        let err = engine.generate(&request).await.unwrap_err();
        assert!(matches!(err, VoucherError::BadRequest(_)));
        assert_eq!(
            err.to_string(),
            "Invalid aircraft type. Supported types: ATR, Airbus 320, Boeing 737 Max"
        );

        seed_voucher(&store, ["1A", "1C", "1D"]).await;
        let mut request = issue_request();
        request.aircraft = "Cessna".to_string();
        request.is_regenerate = true;
        request.updated_seats = vec!["1C".to_string()];
        let err = engine.generate(&request).await.unwrap_err();
        assert!(matches!(err, VoucherError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_regenerate_replaces_only_matched_seats() {
        let (engine, store) = engine_with_store(AssignmentRules::default());
        let date = seed_voucher(&store, ["1A", "1C", "1D"]).await;

        let mut request = issue_request();
        request.is_regenerate = true;
        request.updated_seats = vec!["1C".to_string()];
        let seats = engine.generate(&request).await.unwrap();

        assert_eq!(seats[0], "1A");
        assert_eq!(seats[2], "1D");
        assert_ne!(seats[1], "1C");
        assert!(Aircraft::Atr.seat_map().contains(&seats[1]));

        // The store reflects the update.
        let stored = store.fetch_seats("XY123", date).await.unwrap().unwrap();
        assert_eq!(stored, seats);
    }

    #[tokio::test]
    async fn test_regenerate_ignores_labels_not_held() {
        let (engine, store) = engine_with_store(AssignmentRules::default());
        seed_voucher(&store, ["1A", "1C", "1D"]).await;

        let mut request = issue_request();
        request.is_regenerate = true;
        request.updated_seats = vec!["17F".to_string()];
        let seats = engine.generate(&request).await.unwrap();

        assert_eq!(seats, ["1A", "1C", "1D"].map(String::from));
    }

    #[tokio::test]
    async fn test_regenerate_missing_flight_is_not_found() {
        let (engine, _) = engine_with_store(AssignmentRules::default());

        let mut request = issue_request();
        request.is_regenerate = true;
        request.updated_seats = vec!["1C".to_string()];
        let err = engine.generate(&request).await.unwrap_err();
        assert!(matches!(err, VoucherError::NotFound(_)));
        assert_eq!(err.to_string(), "seats not found");
    }

    #[tokio::test]
    async fn test_exclusion_policy_never_collides_with_retained_seats() {
        let (engine, store) = engine_with_store(AssignmentRules::default());
        let date = seed_voucher(&store, ["1A", "1C", "1D"]).await;

        // Redraw the middle seat many times; with held seats excluded from
        // the pool the triple stays pairwise distinct on every pass.
        for _ in 0..50 {
            let current = store.fetch_seats("XY123", date).await.unwrap().unwrap();

            let mut request = issue_request();
            request.is_regenerate = true;
            request.updated_seats = vec![current[1].clone()];
            let seats = engine.generate(&request).await.unwrap();

            assert_eq!(seats[0], current[0]);
            assert_eq!(seats[2], current[2]);
            assert_ne!(seats[1], current[1]);
            assert_ne!(seats[1], seats[0]);
            assert_ne!(seats[1], seats[2]);
        }
    }

    #[tokio::test]
    async fn test_permissive_policy_keeps_retained_positions() {
        let rules = AssignmentRules {
            exclude_held_seats: false,
        };
        let (engine, store) = engine_with_store(rules);
        seed_voucher(&store, ["1A", "1C", "1D"]).await;

        let mut request = issue_request();
        request.is_regenerate = true;
        request.updated_seats = vec!["1C".to_string()];
        let seats = engine.generate(&request).await.unwrap();

        // Retained positions are untouched; the replacement comes from the
        // full map and may collide with them.
        assert_eq!(seats[0], "1A");
        assert_eq!(seats[2], "1D");
        assert!(Aircraft::Atr.seat_map().contains(&seats[1]));
    }

    #[tokio::test]
    async fn test_generate_runs_on_spawned_tasks() {
        let (engine, store) = engine_with_store(AssignmentRules::default());

        // Spawned tasks move futures across worker threads, so both paths
        // must produce Send futures.
        let issuing = engine.clone();
        tokio::spawn(async move { issuing.generate(&issue_request()).await })
            .await
            .unwrap()
            .unwrap();
        assert!(engine.check_exists("XY123", "2024-03-15").await.unwrap());

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let current = store.fetch_seats("XY123", date).await.unwrap().unwrap();

        let mut request = issue_request();
        request.is_regenerate = true;
        request.updated_seats = vec![current[1].clone()];

        let regenerating = engine.clone();
        let seats = tokio::spawn(async move { regenerating.generate(&request).await })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(seats[0], current[0]);
        assert_ne!(seats[1], current[1]);
    }

    #[tokio::test]
    async fn test_regenerate_multiple_seats_in_one_request() {
        let (engine, store) = engine_with_store(AssignmentRules::default());
        seed_voucher(&store, ["1A", "1C", "1D"]).await;

        let mut request = issue_request();
        request.is_regenerate = true;
        request.updated_seats = vec!["1A".to_string(), "1D".to_string()];
        let seats = engine.generate(&request).await.unwrap();

        assert_eq!(seats[1], "1C");
        assert_ne!(seats[0], "1A");
        assert_ne!(seats[2], "1D");
        assert_ne!(seats[0], seats[2]);
    }
}
