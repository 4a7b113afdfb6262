use uuid::Uuid;

use crate::domain::WasteRequest;

/// Geographic proximity collaborator.
///
/// Geocoding and distance math live outside this subsystem; the engine hands
/// over candidates and takes back the nearby subset, preserving order.
#[mockall::automock]
#[async_trait::async_trait]
pub trait GeoPort {
    async fn filter_near(
        &self,
        fulfiller_id: Uuid,
        candidates: Vec<WasteRequest>,
    ) -> Result<Vec<WasteRequest>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
