use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::models::{DbReservation, DbReservationDetail, DbSession, DbTable, DbUser};
use crate::repositories::reservation::{CreateOutcome, UpdateOutcome};
use crate::repositories::table::TableInsert;

// Mock repositories for testing
mock! {
    pub ReservationRepo {
        pub async fn find_conflicting(
            &self,
            table_id: Uuid,
            date: NaiveDate,
            time_start: NaiveTime,
            time_end: NaiveTime,
            exclude: Option<Uuid>,
        ) -> eyre::Result<Option<DbReservation>>;

        pub async fn create_reservation(
            &self,
            user_id: Uuid,
            table_id: Uuid,
            date: NaiveDate,
            time_start: NaiveTime,
            time_end: NaiveTime,
            status: &'static str,
        ) -> eyre::Result<CreateOutcome>;

        pub async fn update_reservation(
            &self,
            id: Uuid,
            date: NaiveDate,
            time_start: NaiveTime,
            time_end: NaiveTime,
            status: &'static str,
            table_id: Uuid,
            check_conflict: bool,
        ) -> eyre::Result<UpdateOutcome>;

        pub async fn get_reservation_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbReservation>>;

        pub async fn list_reservations(&self) -> eyre::Result<Vec<DbReservationDetail>>;

        pub async fn list_reservations_by_user(
            &self,
            user_id: Uuid,
        ) -> eyre::Result<Vec<DbReservationDetail>>;

        pub async fn set_reservation_status(
            &self,
            id: Uuid,
            status: &'static str,
        ) -> eyre::Result<Option<DbReservation>>;

        pub async fn delete_reservation(&self, id: Uuid) -> eyre::Result<bool>;
    }
}

mock! {
    pub TableRepo {
        pub async fn create_table(
            &self,
            table_number: i32,
            status: &'static str,
        ) -> eyre::Result<TableInsert>;

        pub async fn get_table_by_id(&self, id: Uuid) -> eyre::Result<Option<DbTable>>;

        pub async fn list_tables(&self) -> eyre::Result<Vec<DbTable>>;

        pub async fn update_table(
            &self,
            id: Uuid,
            table_number: Option<i32>,
            status: Option<&'static str>,
        ) -> eyre::Result<Option<DbTable>>;

        pub async fn delete_table(&self, id: Uuid) -> eyre::Result<bool>;
    }
}

mock! {
    pub UserRepo {
        pub async fn create_user(
            &self,
            name: &'static str,
            email: &'static str,
            password_hash: &'static str,
            role: &'static str,
        ) -> eyre::Result<DbUser>;

        pub async fn get_user_by_id(&self, id: Uuid) -> eyre::Result<Option<DbUser>>;

        pub async fn get_user_by_email(
            &self,
            email: &'static str,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn list_users(&self) -> eyre::Result<Vec<DbUser>>;

        pub async fn verify_credentials(
            &self,
            email: &'static str,
            password: &'static str,
        ) -> eyre::Result<Option<DbUser>>;
    }
}

mock! {
    pub SessionRepo {
        pub async fn create_session(
            &self,
            token: &'static str,
            user_id: Uuid,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<DbSession>;

        pub async fn get_session_user(
            &self,
            token: &'static str,
        ) -> eyre::Result<Option<DbUser>>;
    }
}
