//! In-memory adapter backing demos, local serving, and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::workflows::assignment::domain::{
    CaFirm, CaId, ClientId, FirmId, FirmMembership, MemberRole, ServiceType, UserId,
};
use crate::workflows::assignment::repository::RepositoryError;

use super::conflict::ConflictSnapshot;
use super::domain::{IndependentRequestId, IndependentWorkRequest};
use super::repository::IndependentWorkRepository;

#[derive(Default)]
struct StoreInner {
    firms: HashMap<FirmId, CaFirm>,
    memberships: HashMap<(FirmId, CaId), FirmMembership>,
    snapshots: HashMap<(FirmId, CaId, ClientId), ConflictSnapshot>,
    requests: HashMap<IndependentRequestId, IndependentWorkRequest>,
    roles: HashMap<FirmId, HashMap<UserId, MemberRole>>,
}

/// Mutex-backed store for the independent-work workflow.
#[derive(Default, Clone)]
pub struct MemoryIndependentStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryIndependentStore {
    pub fn insert_firm(&self, firm: CaFirm) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.firms.insert(firm.id.clone(), firm);
    }

    pub fn insert_membership(&self, membership: FirmMembership) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.memberships.insert(
            (membership.firm_id.clone(), membership.ca_id.clone()),
            membership,
        );
    }

    pub fn insert_snapshot(
        &self,
        firm_id: FirmId,
        ca_id: CaId,
        client_id: ClientId,
        snapshot: ConflictSnapshot,
    ) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.snapshots.insert((firm_id, ca_id, client_id), snapshot);
    }

    pub fn insert_role(&self, firm_id: FirmId, user: UserId, role: MemberRole) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.roles.entry(firm_id).or_default().insert(user, role);
    }

    pub fn request(&self, id: &IndependentRequestId) -> Option<IndependentWorkRequest> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.requests.get(id).cloned()
    }
}

impl IndependentWorkRepository for MemoryIndependentStore {
    fn firm(&self, id: &FirmId) -> Result<Option<CaFirm>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.firms.get(id).cloned())
    }

    fn active_membership(
        &self,
        firm_id: &FirmId,
        ca_id: &CaId,
    ) -> Result<Option<FirmMembership>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .memberships
            .get(&(firm_id.clone(), ca_id.clone()))
            .filter(|membership| membership.is_active)
            .cloned())
    }

    fn conflict_snapshot(
        &self,
        firm_id: &FirmId,
        ca_id: &CaId,
        client_id: &ClientId,
        _service_type: ServiceType,
    ) -> Result<ConflictSnapshot, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .snapshots
            .get(&(firm_id.clone(), ca_id.clone(), client_id.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn insert(
        &self,
        request: IndependentWorkRequest,
    ) -> Result<IndependentWorkRequest, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.requests.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch(
        &self,
        id: &IndependentRequestId,
    ) -> Result<Option<IndependentWorkRequest>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.requests.get(id).cloned())
    }

    fn update(&self, request: IndependentWorkRequest) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if !inner.requests.contains_key(&request.id) {
            return Err(RepositoryError::NotFound);
        }
        inner.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn actor_role(
        &self,
        firm_id: &FirmId,
        actor: &UserId,
    ) -> Result<Option<MemberRole>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .roles
            .get(firm_id)
            .and_then(|roles| roles.get(actor))
            .copied())
    }
}
