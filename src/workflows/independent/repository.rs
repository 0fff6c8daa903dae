use crate::workflows::assignment::domain::{
    CaId, ClientId, FirmId, FirmMembership, MemberRole, ServiceType, UserId,
};
use crate::workflows::assignment::repository::RepositoryError;
use crate::workflows::assignment::CaFirm;

use super::conflict::ConflictSnapshot;
use super::domain::{IndependentRequestId, IndependentWorkRequest};

/// Storage abstraction for the independent-work workflow. The conflict
/// snapshot is fetched in one call so the check battery runs over a
/// consistent view.
pub trait IndependentWorkRepository: Send + Sync {
    fn firm(&self, id: &FirmId) -> Result<Option<CaFirm>, RepositoryError>;

    /// The professional's active membership in the firm, if any.
    fn active_membership(
        &self,
        firm_id: &FirmId,
        ca_id: &CaId,
    ) -> Result<Option<FirmMembership>, RepositoryError>;

    /// Relationship and workload figures for the (firm, professional, client)
    /// triple, pre-aggregated by the store.
    fn conflict_snapshot(
        &self,
        firm_id: &FirmId,
        ca_id: &CaId,
        client_id: &ClientId,
        service_type: ServiceType,
    ) -> Result<ConflictSnapshot, RepositoryError>;

    fn insert(
        &self,
        request: IndependentWorkRequest,
    ) -> Result<IndependentWorkRequest, RepositoryError>;

    fn fetch(
        &self,
        id: &IndependentRequestId,
    ) -> Result<Option<IndependentWorkRequest>, RepositoryError>;

    fn update(&self, request: IndependentWorkRequest) -> Result<(), RepositoryError>;

    fn actor_role(
        &self,
        firm_id: &FirmId,
        actor: &UserId,
    ) -> Result<Option<MemberRole>, RepositoryError>;
}
