use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingChanges, NewBooking};
use crate::database::StoreError;

/// Persistence capability for [`Booking`] records.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find(&self) -> Result<Vec<Booking>, StoreError>;

    async fn find_by_id(&self, id: Uuid)
    -> Result<Option<Booking>, StoreError>;

    async fn create(&self, booking: NewBooking) -> Result<Booking, StoreError>;

    async fn update(
        &self,
        id: Uuid,
        changes: BookingChanges,
    ) -> Result<Option<Booking>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
