use crate::{
    domain::WasteRequest,
    ports::geo::{Error, GeoPort},
};
use uuid::Uuid;

/// Proximity filter that keeps every candidate.
///
/// Stands in wherever no geocoding collaborator is wired up, e.g. tests and
/// single-region deployments.
#[derive(Clone, Debug, Default)]
pub struct PassthroughGeo;

#[async_trait::async_trait]
impl GeoPort for PassthroughGeo {
    async fn filter_near(
        &self,
        _fulfiller_id: Uuid,
        candidates: Vec<WasteRequest>,
    ) -> Result<Vec<WasteRequest>, Error> {
        Ok(candidates)
    }
}
