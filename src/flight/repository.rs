use async_trait::async_trait;
use uuid::Uuid;

use crate::database::StoreError;
use crate::flight::{
    AveragePrice, Flight, FlightChanges, FlightFilter, GroupBy, NewFlight,
};

/// Persistence capability for [`Flight`] records.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn find(
        &self,
        filter: &FlightFilter,
    ) -> Result<Vec<Flight>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Flight>, StoreError>;

    async fn create(&self, flight: NewFlight) -> Result<Flight, StoreError>;

    async fn update(
        &self,
        id: Uuid,
        changes: FlightChanges,
    ) -> Result<Option<Flight>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Average price per group, ordered by group key.
    async fn average_price(
        &self,
        group_by: GroupBy,
    ) -> Result<Vec<AveragePrice>, StoreError>;
}
