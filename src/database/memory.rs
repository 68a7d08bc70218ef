//! In-memory store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::booking::{Booking, BookingChanges, BookingRepository, NewBooking};
use crate::database::StoreError;
use crate::flight::{
    AveragePrice, Flight, FlightChanges, FlightFilter, FlightRepository,
    GroupBy, NewFlight,
};
use crate::user::{NewUser, User, UserChanges, UserFilter, UserRepository};

/// Maps guarded by async locks. Listing keeps insertion order.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    flights: RwLock<Vec<Flight>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.refresh_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password: user.password,
            refresh_token: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id != id && u.email == changes.email) {
            return Err(StoreError::Duplicate("email"));
        }

        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.name = changes.name;
            user.email = changes.email;
            user.clone()
        }))
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.refresh_token = token.map(str::to_owned);
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let len = users.len();
        users.retain(|u| u.id != id);

        Ok(users.len() != len)
    }
}

#[async_trait]
impl FlightRepository for MemoryStore {
    async fn find(
        &self,
        filter: &FlightFilter,
    ) -> Result<Vec<Flight>, StoreError> {
        let flights = self.flights.read().await;
        let mut found: Vec<Flight> =
            flights.iter().filter(|f| filter.matches(f)).cloned().collect();

        if let Some(order) = filter.sort_by_price {
            found.sort_by(|a, b| order.compare(a, b));
        }

        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Flight>, StoreError> {
        let flights = self.flights.read().await;
        Ok(flights.iter().find(|f| f.id == id).cloned())
    }

    async fn create(&self, flight: NewFlight) -> Result<Flight, StoreError> {
        let flight = Flight {
            id: Uuid::new_v4(),
            origin: flight.origin,
            destination: flight.destination,
            price: flight.price,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            user_id: flight.user_id,
        };
        self.flights.write().await.push(flight.clone());

        Ok(flight)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: FlightChanges,
    ) -> Result<Option<Flight>, StoreError> {
        let mut flights = self.flights.write().await;

        Ok(flights.iter_mut().find(|f| f.id == id).map(|flight| {
            flight.origin = changes.origin;
            flight.destination = changes.destination;
            flight.price = changes.price;
            flight.departure_time = changes.departure_time;
            flight.arrival_time = changes.arrival_time;
            flight.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut flights = self.flights.write().await;
        let len = flights.len();
        flights.retain(|f| f.id != id);

        Ok(flights.len() != len)
    }

    async fn average_price(
        &self,
        group_by: GroupBy,
    ) -> Result<Vec<AveragePrice>, StoreError> {
        let flights = self.flights.read().await;
        let mut groups: BTreeMap<&str, (f64, u32)> = BTreeMap::new();

        for flight in flights.iter() {
            let (sum, count) = groups.entry(group_by.key(flight)).or_default();
            *sum += flight.price;
            *count += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(key, (sum, count))| AveragePrice {
                key: key.to_owned(),
                average_price: sum / f64::from(count),
            })
            .collect())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn find(&self) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        let mut all: Vec<Booking> = bookings.values().cloned().collect();
        all.sort_by_key(|b| b.booking_date);

        Ok(all)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn create(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            flight_id: booking.flight_id,
            booking_date: booking.booking_date,
            status: booking.status,
        };
        self.bookings
            .write()
            .await
            .insert(booking.id, booking.clone());

        Ok(booking)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: BookingChanges,
    ) -> Result<Option<Booking>, StoreError> {
        let mut bookings = self.bookings.write().await;

        Ok(bookings.get_mut(&id).map(|booking| {
            changes.apply(booking);
            booking.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.bookings.write().await.remove(&id).is_some())
    }
}
