//! PostgreSQL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::booking::{
    Booking, BookingChanges, BookingRepository, BookingStatus, NewBooking,
};
use crate::database::StoreError;
use crate::flight::{
    AveragePrice, Flight, FlightChanges, FlightFilter, FlightRepository,
    GroupBy, NewFlight,
};
use crate::user::{NewUser, User, UserChanges, UserFilter, UserRepository};

const USER_COLUMNS: &str =
    "id, name, email, password, refresh_token, created_at";
const FLIGHT_COLUMNS: &str =
    "id, origin, destination, price, departure_time, arrival_time, user_id";
const BOOKING_COLUMNS: &str = "id, user_id, flight_id, booking_date, status";

/// Repositories backed by a PostgreSQL pool.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map unique violations onto [`StoreError::Duplicate`].
fn unique(field: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| match err.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Duplicate(field),
        _ => StoreError::Sql(err),
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users
            WHERE ($1::TEXT IS NULL OR name = $1)
            AND ($2::TEXT IS NULL OR email = $2)
            ORDER BY created_at"#
        ))
        .bind(filter.name.as_deref())
        .bind(filter.email.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE refresh_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}"#
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(unique("email"))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users SET name = $2, email = $3
            WHERE id = $1
            RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique("email"))
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FlightRepository for PgStore {
    async fn find(
        &self,
        filter: &FlightFilter,
    ) -> Result<Vec<Flight>, StoreError> {
        // Only the direction keyword is interpolated, never user input.
        let order = filter
            .sort_by_price
            .map(|order| format!("price {}, ", order.as_sql()))
            .unwrap_or_default();

        let flights = sqlx::query_as::<_, Flight>(&format!(
            r#"SELECT {FLIGHT_COLUMNS} FROM flights
            WHERE ($1::TEXT IS NULL OR origin = $1)
            AND ($2::TEXT IS NULL OR destination = $2)
            ORDER BY {order}created_at"#
        ))
        .bind(filter.origin.as_deref())
        .bind(filter.destination.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(flights)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Flight>, StoreError> {
        let flight = sqlx::query_as::<_, Flight>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(flight)
    }

    async fn create(&self, flight: NewFlight) -> Result<Flight, StoreError> {
        let flight = sqlx::query_as::<_, Flight>(&format!(
            r#"INSERT INTO flights
            (origin, destination, price, departure_time, arrival_time, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FLIGHT_COLUMNS}"#
        ))
        .bind(flight.origin)
        .bind(flight.destination)
        .bind(flight.price)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .bind(flight.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(flight)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: FlightChanges,
    ) -> Result<Option<Flight>, StoreError> {
        let flight = sqlx::query_as::<_, Flight>(&format!(
            r#"UPDATE flights SET origin = $2, destination = $3, price = $4,
            departure_time = $5, arrival_time = $6
            WHERE id = $1
            RETURNING {FLIGHT_COLUMNS}"#
        ))
        .bind(id)
        .bind(changes.origin)
        .bind(changes.destination)
        .bind(changes.price)
        .bind(changes.departure_time)
        .bind(changes.arrival_time)
        .fetch_optional(&self.pool)
        .await?;

        Ok(flight)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn average_price(
        &self,
        group_by: GroupBy,
    ) -> Result<Vec<AveragePrice>, StoreError> {
        let column = group_by.column();
        let averages = sqlx::query_as::<_, AveragePrice>(&format!(
            r#"SELECT {column} AS key, AVG(price)::DOUBLE PRECISION AS average_price
            FROM flights
            GROUP BY {column}
            ORDER BY {column}"#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(averages)
    }
}

/// Raw booking row, `status` is kept as text in database.
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    flight_id: Uuid,
    booking_date: DateTime<Utc>,
    status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            flight_id: row.flight_id,
            booking_date: row.booking_date,
            status: row.status.parse().map_err(StoreError::Corrupted)?,
        })
    }
}

#[async_trait]
impl BookingRepository for PgStore {
    async fn find(&self) -> Result<Vec<Booking>, StoreError> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_date"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Booking::try_from)
        .collect()
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Booking::try_from)
        .transpose()
    }

    async fn create(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        sqlx::query_as::<_, BookingRow>(&format!(
            r#"INSERT INTO bookings (user_id, flight_id, booking_date, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {BOOKING_COLUMNS}"#
        ))
        .bind(booking.user_id)
        .bind(booking.flight_id)
        .bind(booking.booking_date)
        .bind(booking.status.to_string())
        .fetch_one(&self.pool)
        .await?
        .try_into()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: BookingChanges,
    ) -> Result<Option<Booking>, StoreError> {
        sqlx::query_as::<_, BookingRow>(&format!(
            r#"UPDATE bookings SET
            booking_date = COALESCE($2, booking_date),
            status = COALESCE($3, status)
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}"#
        ))
        .bind(id)
        .bind(changes.booking_date)
        .bind(changes.status.map(|status| status.to_string()))
        .fetch_optional(&self.pool)
        .await?
        .map(Booking::try_from)
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::SortOrder;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".into(),
            email: email.into(),
            password: Some("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".into()),
        }
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_user_lifecycle(pool: Pool<Postgres>) {
        let store = PgStore::new(pool);

        let user = UserRepository::create(&store, new_user("alice@x.com"))
            .await
            .unwrap();
        assert!(matches!(
            UserRepository::create(&store, new_user("alice@x.com")).await,
            Err(StoreError::Duplicate("email"))
        ));

        store.set_refresh_token(user.id, Some("token")).await.unwrap();
        let found = store.find_by_refresh_token("token").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        assert!(UserRepository::delete(&store, user.id).await.unwrap());
        assert!(
            UserRepository::find_by_id(&store, user.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_flights_sort_and_average(pool: Pool<Postgres>) {
        let store = PgStore::new(pool);
        let user_id = Uuid::new_v4();

        for (origin, price) in [("JFK", 500.0), ("JFK", 300.0), ("LHR", 80.0)] {
            FlightRepository::create(
                &store,
                NewFlight {
                    origin: origin.into(),
                    destination: "CDG".into(),
                    price,
                    departure_time: None,
                    arrival_time: None,
                    user_id,
                },
            )
            .await
            .unwrap();
        }

        let filter = FlightFilter {
            sort_by_price: Some(SortOrder::Descending),
            ..Default::default()
        };
        let flights = FlightRepository::find(&store, &filter).await.unwrap();
        assert_eq!(flights[0].price, 500.0);
        assert_eq!(flights[2].price, 80.0);

        let averages = store.average_price(GroupBy::Origin).await.unwrap();
        assert_eq!(averages[0].key, "JFK");
        assert_eq!(averages[0].average_price, 400.0);
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_booking_status_roundtrip(pool: Pool<Postgres>) {
        let store = PgStore::new(pool);

        let booking = BookingRepository::create(
            &store,
            NewBooking {
                user_id: Uuid::new_v4(),
                flight_id: Uuid::new_v4(),
                booking_date: Utc::now(),
                status: BookingStatus::Pending,
            },
        )
        .await
        .unwrap();

        let updated = BookingRepository::update(
            &store,
            booking.id,
            BookingChanges {
                booking_date: None,
                status: Some(BookingStatus::Confirmed),
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.status, BookingStatus::Confirmed);
    }
}
