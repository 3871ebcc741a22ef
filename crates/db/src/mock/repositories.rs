use chrono::NaiveDate;
use mockall::mock;
use uuid::Uuid;

use crate::models::{DbReservation, DbSalon, DbService, DbStaff, DbUser};
use crate::repositories::reservation::NewReservation;
use salonbook_core::models::salon::{CreateSalonRequest, UpdateSalonRequest};

// Mock repositories for testing
mock! {
    pub SalonRepo {
        pub async fn create_salon(&self, req: CreateSalonRequest) -> eyre::Result<DbSalon>;

        pub async fn get_salon_by_id(&self, id: Uuid) -> eyre::Result<Option<DbSalon>>;

        pub async fn list_salons(
            &self,
            page: i64,
            limit: i64,
            search: Option<&'static str>,
        ) -> eyre::Result<Vec<DbSalon>>;

        pub async fn update_salon(
            &self,
            id: Uuid,
            req: UpdateSalonRequest,
        ) -> eyre::Result<Option<DbSalon>>;

        pub async fn delete_salon(&self, id: Uuid) -> eyre::Result<bool>;
    }
}

mock! {
    pub StaffRepo {
        pub async fn get_staff_by_id(&self, id: Uuid) -> eyre::Result<Option<DbStaff>>;

        pub async fn get_staff_by_salon(&self, salon_id: Uuid) -> eyre::Result<Vec<DbStaff>>;

        pub async fn get_first_active_staff(
            &self,
            salon_id: Uuid,
        ) -> eyre::Result<Option<DbStaff>>;
    }
}

mock! {
    pub ServiceRepo {
        pub async fn get_service_by_id(&self, id: Uuid) -> eyre::Result<Option<DbService>>;

        pub async fn get_services_by_salon(
            &self,
            salon_id: Uuid,
        ) -> eyre::Result<Vec<DbService>>;
    }
}

mock! {
    pub UserRepo {
        pub async fn create_user(
            &self,
            email: &'static str,
            password_hash: &'static str,
            name: &'static str,
            phone: &'static str,
        ) -> eyre::Result<DbUser>;

        pub async fn get_user_by_email(&self, email: &'static str) -> eyre::Result<Option<DbUser>>;

        pub async fn get_user_by_id(&self, id: Uuid) -> eyre::Result<Option<DbUser>>;
    }
}

mock! {
    pub ReservationRepo {
        pub async fn create_reservation(
            &self,
            new: NewReservation,
        ) -> eyre::Result<DbReservation>;

        pub async fn get_reservations_for_staff_day(
            &self,
            staff_id: Uuid,
            date: NaiveDate,
        ) -> eyre::Result<Vec<DbReservation>>;

        pub async fn list_reservations_for_user(
            &self,
            user_id: Uuid,
        ) -> eyre::Result<Vec<DbReservation>>;

        pub async fn get_reservation_for_user(
            &self,
            id: Uuid,
            user_id: Uuid,
        ) -> eyre::Result<Option<DbReservation>>;

        pub async fn reschedule_reservation(
            &self,
            id: Uuid,
            user_id: Uuid,
            start_time: chrono::DateTime<chrono::Utc>,
            end_time: chrono::DateTime<chrono::Utc>,
            notes: Option<&'static str>,
        ) -> eyre::Result<Option<DbReservation>>;

        pub async fn update_reservation_status(
            &self,
            id: Uuid,
            status: &'static str,
        ) -> eyre::Result<bool>;
    }
}
