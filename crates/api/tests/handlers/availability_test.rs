use chrono::{Duration, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use salonbook_api::middleware::error_handling::AppError;
use salonbook_core::{
    errors::BookingError,
    models::reservation::AvailableSlotsResponse,
    scheduling::{self, TimeInterval},
};

use crate::test_utils::{
    hm, sample_reservation, sample_salon, sample_service, sample_staff, weekday_hours, TestContext,
};

// 2026-09-07 is a Monday
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 7).unwrap()
}

// Mirrors the slots handler flow against the mocked repositories: resolve
// salon, staff (explicit or first active) and service, snapshot the day's
// reservations, run the engine.
async fn slots_wrapper(
    ctx: &TestContext,
    salon_id: Uuid,
    date: NaiveDate,
    service_id: Uuid,
    staff_id: Option<Uuid>,
) -> Result<AvailableSlotsResponse, AppError> {
    ctx.salon_repo
        .get_salon_by_id(salon_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Salon not found".to_string()))?;

    let staff = match staff_id {
        Some(id) => ctx.staff_repo.get_staff_by_id(id).await?,
        None => ctx.staff_repo.get_first_active_staff(salon_id).await?,
    };
    let staff = match staff {
        Some(staff) if staff.salon_id == salon_id => staff,
        _ => return Err(AppError(BookingError::NotFound("Staff not found".to_string()))),
    };

    let service = match ctx.service_repo.get_service_by_id(service_id).await? {
        Some(service) if service.salon_id == salon_id => service,
        _ => {
            return Err(AppError(BookingError::NotFound(
                "Service not found".to_string(),
            )))
        }
    };

    let reservations = ctx
        .reservation_repo
        .get_reservations_for_staff_day(staff.id, date)
        .await?;
    let occupied = reservations
        .iter()
        .map(|r| TimeInterval::new(r.start_time, r.end_time))
        .collect::<Result<Vec<_>, _>>()?;

    let slots = scheduling::available_slots(
        &staff.working_hours.0,
        date,
        Duration::minutes(service.duration_minutes as i64),
        Duration::minutes(30),
        &occupied,
    );

    Ok(AvailableSlotsResponse {
        slots: slots
            .into_iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect(),
    })
}

#[tokio::test]
async fn test_slots_unknown_salon_is_not_found() {
    let mut ctx = TestContext::new();
    ctx.salon_repo
        .expect_get_salon_by_id()
        .returning(|_| Ok(None));

    let result = slots_wrapper(&ctx, Uuid::new_v4(), monday(), Uuid::new_v4(), None).await;

    match result.unwrap_err().0 {
        BookingError::NotFound(_) => {}
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_slots_staff_from_another_salon_is_not_found() {
    let mut ctx = TestContext::new();
    let salon_id = Uuid::new_v4();
    let foreign_staff = sample_staff(Uuid::new_v4(), weekday_hours(&[Weekday::Mon]));
    let foreign_staff_id = foreign_staff.id;

    ctx.salon_repo
        .expect_get_salon_by_id()
        .returning(move |id| Ok(Some(sample_salon(id))));
    ctx.staff_repo
        .expect_get_staff_by_id()
        .returning(move |_| Ok(Some(foreign_staff.clone())));

    let result = slots_wrapper(
        &ctx,
        salon_id,
        monday(),
        Uuid::new_v4(),
        Some(foreign_staff_id),
    )
    .await;

    match result.unwrap_err().0 {
        BookingError::NotFound(msg) => assert_eq!(msg, "Staff not found"),
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_slots_unknown_service_is_not_found() {
    let mut ctx = TestContext::new();
    let salon_id = Uuid::new_v4();
    let staff = sample_staff(salon_id, weekday_hours(&[Weekday::Mon]));

    ctx.salon_repo
        .expect_get_salon_by_id()
        .returning(move |id| Ok(Some(sample_salon(id))));
    ctx.staff_repo
        .expect_get_first_active_staff()
        .returning(move |_| Ok(Some(staff.clone())));
    ctx.service_repo
        .expect_get_service_by_id()
        .returning(|_| Ok(None));

    let result = slots_wrapper(&ctx, salon_id, monday(), Uuid::new_v4(), None).await;

    match result.unwrap_err().0 {
        BookingError::NotFound(msg) => assert_eq!(msg, "Service not found"),
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_slots_day_off_is_empty_list_not_error() {
    let mut ctx = TestContext::new();
    let salon_id = Uuid::new_v4();
    // Works Tuesdays only; the query asks about a Monday
    let staff = sample_staff(salon_id, weekday_hours(&[Weekday::Tue]));
    let service = sample_service(salon_id, 60);
    let service_id = service.id;

    ctx.salon_repo
        .expect_get_salon_by_id()
        .returning(move |id| Ok(Some(sample_salon(id))));
    ctx.staff_repo
        .expect_get_first_active_staff()
        .returning(move |_| Ok(Some(staff.clone())));
    ctx.service_repo
        .expect_get_service_by_id()
        .returning(move |_| Ok(Some(service.clone())));
    ctx.reservation_repo
        .expect_get_reservations_for_staff_day()
        .returning(|_, _| Ok(vec![]));

    let response = slots_wrapper(&ctx, salon_id, monday(), service_id, None)
        .await
        .unwrap();

    assert!(response.slots.is_empty());
}

#[tokio::test]
async fn test_slots_free_day_full_grid() {
    let mut ctx = TestContext::new();
    let salon_id = Uuid::new_v4();
    let staff = sample_staff(salon_id, weekday_hours(&[Weekday::Mon]));
    let service = sample_service(salon_id, 60);
    let service_id = service.id;

    ctx.salon_repo
        .expect_get_salon_by_id()
        .returning(move |id| Ok(Some(sample_salon(id))));
    ctx.staff_repo
        .expect_get_first_active_staff()
        .returning(move |_| Ok(Some(staff.clone())));
    ctx.service_repo
        .expect_get_service_by_id()
        .returning(move |_| Ok(Some(service.clone())));
    ctx.reservation_repo
        .expect_get_reservations_for_staff_day()
        .returning(|_, _| Ok(vec![]));

    let response = slots_wrapper(&ctx, salon_id, monday(), service_id, None)
        .await
        .unwrap();

    // 09:00 through 16:00 inclusive at 30-minute steps for a 60-minute
    // service inside 09:00-17:00
    assert_eq!(response.slots.len(), 15);
    assert_eq!(response.slots.first().unwrap(), "09:00");
    assert_eq!(response.slots.last().unwrap(), "16:00");
    let mut sorted = response.slots.clone();
    sorted.sort();
    assert_eq!(response.slots, sorted);
}

#[tokio::test]
async fn test_slots_exclude_occupied_intervals() {
    let mut ctx = TestContext::new();
    let salon_id = Uuid::new_v4();
    let staff = sample_staff(salon_id, weekday_hours(&[Weekday::Mon]));
    let staff_id = staff.id;
    let service = sample_service(salon_id, 60);
    let service_id = service.id;

    // Existing booking 10:00-11:00
    let busy_start = monday().and_time(hm(10, 0)).and_utc();
    let busy_end = monday().and_time(hm(11, 0)).and_utc();

    ctx.salon_repo
        .expect_get_salon_by_id()
        .returning(move |id| Ok(Some(sample_salon(id))));
    ctx.staff_repo
        .expect_get_first_active_staff()
        .returning(move |_| Ok(Some(staff.clone())));
    ctx.service_repo
        .expect_get_service_by_id()
        .returning(move |_| Ok(Some(service.clone())));
    ctx.reservation_repo
        .expect_get_reservations_for_staff_day()
        .returning(move |_, _| {
            Ok(vec![sample_reservation(
                staff_id, busy_start, busy_end, "confirmed",
            )])
        });

    let response = slots_wrapper(&ctx, salon_id, monday(), service_id, None)
        .await
        .unwrap();

    // A 60-minute service cannot start at 09:30, 10:00 or 10:30, but
    // back-to-back starts at 09:00 and 11:00 remain open
    assert!(!response.slots.contains(&"09:30".to_string()));
    assert!(!response.slots.contains(&"10:00".to_string()));
    assert!(!response.slots.contains(&"10:30".to_string()));
    assert!(response.slots.contains(&"09:00".to_string()));
    assert!(response.slots.contains(&"11:00".to_string()));
}
