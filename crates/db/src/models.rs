use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use cuetime_core::models::{
    reservation::{Reservation, ReservationDetail, TableRef, UserRef},
    table::BilliardTable,
    user::User,
};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTable {
    pub id: Uuid,
    pub table_number: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReservation {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub status: String,
    pub user_id: Uuid,
    pub table_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A reservation row joined with its user and table, for the listing queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReservationDetail {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub status: String,
    pub user_id: Uuid,
    pub table_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
    pub table_number: i32,
    pub table_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = eyre::Report;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse().map_err(|e: String| eyre!(e))?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbTable> for BilliardTable {
    type Error = eyre::Report;

    fn try_from(row: DbTable) -> Result<Self, Self::Error> {
        Ok(BilliardTable {
            id: row.id,
            table_number: row.table_number,
            status: row.status.parse().map_err(|e: String| eyre!(e))?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbReservation> for Reservation {
    type Error = eyre::Report;

    fn try_from(row: DbReservation) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            date: row.date,
            time_start: row.time_start,
            time_end: row.time_end,
            status: row.status.parse().map_err(|e: String| eyre!(e))?,
            user_id: row.user_id,
            table_id: row.table_id,
            created_at: row.created_at,
        })
    }
}

impl DbReservationDetail {
    /// Converts the joined row into the API detail shape. The user reference
    /// is optional so callers can omit it (e.g. a user listing their own
    /// reservations).
    pub fn into_detail(self, include_user: bool) -> eyre::Result<ReservationDetail> {
        let user = include_user.then(|| UserRef {
            id: self.user_id,
            name: self.user_name.clone(),
            email: self.user_email.clone(),
        });
        let table = TableRef {
            id: self.table_id,
            table_number: self.table_number,
            status: self.table_status.parse().map_err(|e: String| eyre!(e))?,
        };
        let reservation = Reservation {
            id: self.id,
            date: self.date,
            time_start: self.time_start,
            time_end: self.time_end,
            status: self.status.parse().map_err(|e: String| eyre!(e))?,
            user_id: self.user_id,
            table_id: self.table_id,
            created_at: self.created_at,
        };
        Ok(ReservationDetail {
            reservation,
            user,
            table,
        })
    }
}
