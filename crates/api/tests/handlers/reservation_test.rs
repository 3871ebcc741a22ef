use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use salonbook_api::{middleware::error_handling::AppError, BookingLocks};
use salonbook_core::{
    errors::{BookingError, BookingResult},
    models::reservation::{Reservation, ReservationStatus},
    scheduling::{self, TimeInterval, WorkingHours},
};
use salonbook_db::models::DbReservation;

use crate::test_utils::{hm, sample_reservation, weekday_hours, TestContext};

// 2026-09-07 is a Monday
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 7).unwrap()
}

/// In-memory stand-in for the reservations table: admission runs under the
/// per-`(staff, date)` lock exactly as the handler does, with the store
/// snapshot taken inside the critical section.
struct InMemoryBookings {
    locks: BookingLocks,
    intervals: Mutex<Vec<TimeInterval>>,
}

impl InMemoryBookings {
    fn new() -> Self {
        Self {
            locks: BookingLocks::new(),
            intervals: Mutex::new(Vec::new()),
        }
    }

    async fn try_reserve(
        &self,
        hours: &WorkingHours,
        staff_id: Uuid,
        date: NaiveDate,
        start_hm: (u32, u32),
        duration: Duration,
    ) -> BookingResult<TimeInterval> {
        let start = date.and_time(hm(start_hm.0, start_hm.1)).and_utc();
        let now = date.and_time(hm(0, 0)).and_utc() - Duration::days(1);

        let lock = self.locks.lock_for(staff_id, date);
        let _guard = lock.lock().await;

        let occupied = self.intervals.lock().unwrap().clone();
        let admitted = scheduling::check_admission(hours, &occupied, start, duration, now)?;
        self.intervals.lock().unwrap().push(admitted);
        Ok(admitted)
    }
}

#[test_log::test(tokio::test)]
async fn test_concurrent_identical_bookings_admit_exactly_one() {
    let bookings = Arc::new(InMemoryBookings::new());
    let hours = Arc::new(weekday_hours(&[Weekday::Mon]));
    let staff_id = Uuid::new_v4();

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let bookings = Arc::clone(&bookings);
        let hours = Arc::clone(&hours);
        tasks.push(tokio::spawn(async move {
            bookings
                .try_reserve(&hours, staff_id, monday(), (10, 0), Duration::minutes(60))
                .await
        }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(BookingError::SlotUnavailable(_)) => rejected += 1,
            Err(e) => panic!("Expected SlotUnavailable for the loser, got: {:?}", e),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(rejected, 1);
    assert_eq!(bookings.intervals.lock().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_concurrent_bookings_never_overlap() {
    let bookings = Arc::new(InMemoryBookings::new());
    let hours = Arc::new(weekday_hours(&[Weekday::Mon]));
    let staff_id = Uuid::new_v4();

    // Eight concurrent attempts over five distinct hour-long slots; the
    // duplicates must all lose
    let attempts: Vec<(u32, u32)> = vec![
        (9, 0),
        (9, 0),
        (10, 0),
        (10, 30),
        (11, 0),
        (12, 0),
        (12, 0),
        (13, 0),
    ];

    let mut tasks = Vec::new();
    for start in attempts {
        let bookings = Arc::clone(&bookings);
        let hours = Arc::clone(&hours);
        tasks.push(tokio::spawn(async move {
            bookings
                .try_reserve(&hours, staff_id, monday(), start, Duration::minutes(60))
                .await
        }));
    }
    for task in tasks {
        let _ = task.await.unwrap();
    }

    let stored = bookings.intervals.lock().unwrap().clone();
    // (10,0)/(10,30) conflict as do the duplicate pairs, so at most five
    // and at least four can land depending on arrival order
    assert!(stored.len() >= 4 && stored.len() <= 5);
    for (i, a) in stored.iter().enumerate() {
        for b in stored.iter().skip(i + 1) {
            assert!(!a.overlaps(b), "stored intervals overlap: {:?} {:?}", a, b);
        }
    }
}

#[tokio::test]
async fn test_bookings_for_different_staff_do_not_contend() {
    let bookings = InMemoryBookings::new();
    let hours = weekday_hours(&[Weekday::Mon]);

    // Same slot, two different staff members: both admitted because the
    // snapshot here is per store, and real storage scopes it per staff
    let first = bookings
        .try_reserve(
            &hours,
            Uuid::new_v4(),
            monday(),
            (9, 0),
            Duration::minutes(60),
        )
        .await;
    assert!(first.is_ok());

    let lock_a = bookings.locks.lock_for(Uuid::new_v4(), monday());
    let lock_b = bookings.locks.lock_for(Uuid::new_v4(), monday());
    // Distinct keys yield distinct mutexes
    assert!(!Arc::ptr_eq(&lock_a, &lock_b));

    // The same key yields the same mutex
    let staff_id = Uuid::new_v4();
    let lock_c = bookings.locks.lock_for(staff_id, monday());
    let lock_d = bookings.locks.lock_for(staff_id, monday());
    assert!(Arc::ptr_eq(&lock_c, &lock_d));
}

#[tokio::test]
async fn test_booking_locks_evict_released_keys() {
    let locks = BookingLocks::new();

    // Burn through many distinct keys, releasing each lock immediately
    for i in 0..10_000i64 {
        let date = monday() + Duration::days(i % 365);
        let lock = locks.lock_for(Uuid::new_v4(), date);
        let _guard = lock.lock().await;
    }

    // Dead entries are pruned on the next acquisition; only the key still
    // held stays tracked
    let staff_id = Uuid::new_v4();
    let held = locks.lock_for(staff_id, monday());
    let _guard = held.lock().await;
    assert_eq!(locks.tracked_keys(), 1);

    // A second live key coexists with the held one
    let other = locks.lock_for(Uuid::new_v4(), monday() + Duration::days(1));
    assert_eq!(locks.tracked_keys(), 2);
    drop(other);

    // Releasing and re-acquiring the same key reuses a fresh mutex rather
    // than resurrecting the dropped one
    drop(_guard);
    drop(held);
    let again = locks.lock_for(staff_id, monday());
    let _guard = again.lock().await;
    assert_eq!(locks.tracked_keys(), 1);
}

// Mirrors the reschedule flow: owner-scoped fetch, cancelled guard, fresh
// admission check with the reservation's own interval excluded, persisted
// move.
async fn reschedule_wrapper(
    ctx: &TestContext,
    id: Uuid,
    user_id: Uuid,
    new_date: NaiveDate,
    new_start: (u32, u32),
) -> Result<Reservation, AppError> {
    let row = ctx
        .reservation_repo
        .get_reservation_for_user(id, user_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;

    let status = row.status.parse::<ReservationStatus>()?;
    if status == ReservationStatus::Cancelled {
        return Err(AppError(BookingError::InvalidRequest(
            "Cannot reschedule a cancelled reservation".to_string(),
        )));
    }

    let staff = ctx
        .staff_repo
        .get_staff_by_id(row.staff_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Staff not found".to_string()))?;
    let service = ctx
        .service_repo
        .get_service_by_id(row.service_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Service not found".to_string()))?;
    let duration = Duration::minutes(service.duration_minutes as i64);

    let start = new_date.and_time(hm(new_start.0, new_start.1)).and_utc();
    let now = start - Duration::days(1);

    let reservations = ctx
        .reservation_repo
        .get_reservations_for_staff_day(staff.id, new_date)
        .await?;
    let occupied = reservations
        .iter()
        .filter(|r| r.id != id)
        .map(|r| TimeInterval::new(r.start_time, r.end_time))
        .collect::<Result<Vec<_>, _>>()?;

    let interval =
        scheduling::check_admission(&staff.working_hours.0, &occupied, start, duration, now)?;

    let updated = ctx
        .reservation_repo
        .reschedule_reservation(id, user_id, interval.start(), interval.end(), None)
        .await?
        .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;

    Ok(Reservation::try_from(updated)?)
}

/// Builds an owned, internally consistent reservation row for one staff
/// member and service.
fn owned_reservation(
    staff_id: Uuid,
    service_id: Uuid,
    user_id: Uuid,
    start_hm: (u32, u32),
    status: &str,
) -> DbReservation {
    let start = monday().and_time(hm(start_hm.0, start_hm.1)).and_utc();
    let mut row = sample_reservation(staff_id, start, start + Duration::minutes(60), status);
    row.service_id = service_id;
    row.user_id = user_id;
    row
}

#[tokio::test]
async fn test_reschedule_ignores_the_reservations_own_interval() {
    let mut ctx = TestContext::new();
    let salon_id = Uuid::new_v4();
    let staff = crate::test_utils::sample_staff(salon_id, weekday_hours(&[Weekday::Mon]));
    let service = crate::test_utils::sample_service(salon_id, 60);
    let user_id = Uuid::new_v4();

    let own = owned_reservation(staff.id, service.id, user_id, (10, 0), "confirmed");
    let own_id = own.id;
    let snapshot = own.clone();
    let fetched = own.clone();

    ctx.reservation_repo
        .expect_get_reservation_for_user()
        .returning(move |_, _| Ok(Some(fetched.clone())));
    ctx.staff_repo
        .expect_get_staff_by_id()
        .returning(move |_| Ok(Some(staff.clone())));
    ctx.service_repo
        .expect_get_service_by_id()
        .returning(move |_| Ok(Some(service.clone())));
    // The day snapshot still contains the reservation being moved
    ctx.reservation_repo
        .expect_get_reservations_for_staff_day()
        .returning(move |_, _| Ok(vec![snapshot.clone()]));
    ctx.reservation_repo
        .expect_reschedule_reservation()
        .times(1)
        .returning(move |id, _, start, end, _| {
            let mut moved = own.clone();
            moved.id = id;
            moved.start_time = start;
            moved.end_time = end;
            Ok(Some(moved))
        });

    // 10:30 overlaps the old 10:00-11:00 slot; only the reservation itself
    // occupied it, so the move is admitted
    let moved = reschedule_wrapper(&ctx, own_id, user_id, monday(), (10, 30))
        .await
        .unwrap();
    assert_eq!(moved.start_time, monday().and_time(hm(10, 30)).and_utc());
}

#[tokio::test]
async fn test_reschedule_onto_another_booking_is_unavailable() {
    let mut ctx = TestContext::new();
    let salon_id = Uuid::new_v4();
    let staff = crate::test_utils::sample_staff(salon_id, weekday_hours(&[Weekday::Mon]));
    let service = crate::test_utils::sample_service(salon_id, 60);
    let user_id = Uuid::new_v4();

    let own = owned_reservation(staff.id, service.id, user_id, (10, 0), "confirmed");
    let own_id = own.id;
    let other = owned_reservation(staff.id, service.id, Uuid::new_v4(), (13, 0), "confirmed");
    let fetched = own.clone();

    ctx.reservation_repo
        .expect_get_reservation_for_user()
        .returning(move |_, _| Ok(Some(fetched.clone())));
    ctx.staff_repo
        .expect_get_staff_by_id()
        .returning(move |_| Ok(Some(staff.clone())));
    ctx.service_repo
        .expect_get_service_by_id()
        .returning(move |_| Ok(Some(service.clone())));
    ctx.reservation_repo
        .expect_get_reservations_for_staff_day()
        .returning(move |_, _| Ok(vec![own.clone(), other.clone()]));
    // A rejected move never reaches storage
    ctx.reservation_repo.expect_reschedule_reservation().times(0);

    let result = reschedule_wrapper(&ctx, own_id, user_id, monday(), (13, 30)).await;

    match result.unwrap_err().0 {
        BookingError::SlotUnavailable(_) => {}
        e => panic!("Expected SlotUnavailable error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_reschedule_cancelled_reservation_rejected() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let own = owned_reservation(Uuid::new_v4(), Uuid::new_v4(), user_id, (10, 0), "cancelled");
    let own_id = own.id;

    ctx.reservation_repo
        .expect_get_reservation_for_user()
        .returning(move |_, _| Ok(Some(own.clone())));

    let result = reschedule_wrapper(&ctx, own_id, user_id, monday(), (11, 0)).await;

    match result.unwrap_err().0 {
        BookingError::InvalidRequest(msg) => assert!(msg.contains("cancelled")),
        e => panic!("Expected InvalidRequest error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_cancel_confirmed_reservation_updates_status_once() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let start = monday().and_time(hm(10, 0)).and_utc();
    let end = start + Duration::minutes(60);
    let reservation = sample_reservation(Uuid::new_v4(), start, end, "confirmed");
    let reservation_id = reservation.id;

    ctx.reservation_repo
        .expect_get_reservation_for_user()
        .returning(move |_, _| Ok(Some(reservation.clone())));
    ctx.reservation_repo
        .expect_update_reservation_status()
        .times(1)
        .withf(|_, status| status == "cancelled")
        .returning(|_, _| Ok(true));

    // Mirror of the cancel flow: fetch owner-scoped, flip unless already
    // cancelled
    let row = ctx
        .reservation_repo
        .get_reservation_for_user(reservation_id, user_id)
        .await
        .unwrap()
        .unwrap();
    if row.status != "cancelled" {
        ctx.reservation_repo
            .update_reservation_status(reservation_id, "cancelled")
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_cancel_already_cancelled_is_noop_success() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let start = monday().and_time(hm(10, 0)).and_utc();
    let end = start + Duration::minutes(60);
    let reservation = sample_reservation(Uuid::new_v4(), start, end, "cancelled");
    let reservation_id = reservation.id;

    ctx.reservation_repo
        .expect_get_reservation_for_user()
        .returning(move |_, _| Ok(Some(reservation.clone())));
    // No status update may happen for an already-cancelled reservation
    ctx.reservation_repo
        .expect_update_reservation_status()
        .times(0);

    let row = ctx
        .reservation_repo
        .get_reservation_for_user(reservation_id, user_id)
        .await
        .unwrap()
        .unwrap();
    if row.status != "cancelled" {
        ctx.reservation_repo
            .update_reservation_status(reservation_id, "cancelled")
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_cancelled_reservations_free_their_slot() {
    // The snapshot the engine sees is already filtered to occupying
    // statuses; a day whose only reservation was cancelled admits the slot
    let hours = weekday_hours(&[Weekday::Mon]);
    let start = monday().and_time(hm(10, 0)).and_utc();
    let now = start - Duration::days(1);

    let admitted = scheduling::check_admission(&hours, &[], start, Duration::minutes(60), now);
    assert!(admitted.is_ok());
}

#[tokio::test]
async fn test_booking_outside_hours_rejected_before_storage() {
    let hours = weekday_hours(&[Weekday::Mon]);
    // 16:30 + 60 minutes runs past the 17:00 close
    let start = monday().and_time(hm(16, 30)).and_utc();
    let now = start - Duration::days(1);

    let result = scheduling::check_admission(&hours, &[], start, Duration::minutes(60), now);
    assert!(matches!(result, Err(BookingError::OutOfHours(_))));
}
