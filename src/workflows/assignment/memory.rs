//! In-memory adapters backing demos, local serving, and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    AssignmentMethod, AssignmentState, CaFirm, CaId, CandidateSnapshot, FirmId, MemberRole,
    RequestId, ServiceRequest, UserId,
};
use super::repository::{
    AssignmentCommit, AssignmentEvent, AssignmentRepository, Notice, Notifier, NotifyError,
    RepositoryError,
};

#[derive(Default)]
struct StoreInner {
    requests: HashMap<RequestId, ServiceRequest>,
    firms: HashMap<FirmId, CaFirm>,
    rosters: HashMap<FirmId, Vec<CandidateSnapshot>>,
    roles: HashMap<FirmId, HashMap<UserId, MemberRole>>,
    events: Vec<AssignmentEvent>,
}

/// Mutex-backed store. All writes for one request happen under a single lock,
/// which makes `assign_if_unassigned` an atomic conditional update.
#[derive(Default, Clone)]
pub struct MemoryAssignmentStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryAssignmentStore {
    pub fn insert_firm(&self, firm: CaFirm) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.firms.insert(firm.id.clone(), firm);
    }

    pub fn insert_request(&self, request: ServiceRequest) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.requests.insert(request.id.clone(), request);
    }

    pub fn insert_candidate(&self, firm_id: FirmId, candidate: CandidateSnapshot) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.rosters.entry(firm_id).or_default().push(candidate);
    }

    pub fn insert_role(&self, firm_id: FirmId, user: UserId, role: MemberRole) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.roles.entry(firm_id).or_default().insert(user, role);
    }

    pub fn request(&self, id: &RequestId) -> Option<ServiceRequest> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.requests.get(id).cloned()
    }

    pub fn events(&self) -> Vec<AssignmentEvent> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.events.clone()
    }
}

impl AssignmentRepository for MemoryAssignmentStore {
    fn service_request(&self, id: &RequestId) -> Result<Option<ServiceRequest>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.requests.get(id).cloned())
    }

    fn firm(&self, id: &FirmId) -> Result<Option<CaFirm>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.firms.get(id).cloned())
    }

    fn roster(&self, firm_id: &FirmId) -> Result<Vec<CandidateSnapshot>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.rosters.get(firm_id).cloned().unwrap_or_default())
    }

    fn candidate(
        &self,
        firm_id: &FirmId,
        ca_id: &CaId,
    ) -> Result<Option<CandidateSnapshot>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .rosters
            .get(firm_id)
            .and_then(|roster| {
                roster
                    .iter()
                    .find(|candidate| candidate.profile.ca_id == *ca_id)
            })
            .cloned())
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

    fn assign_if_unassigned(
        &self,
        id: &RequestId,
        commit: &AssignmentCommit,
    ) -> Result<Option<ServiceRequest>, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let request = inner.requests.get_mut(id).ok_or(RepositoryError::NotFound)?;

        if !request.assignment_state.accepts(commit.method) {
            return Ok(None);
        }

        request.ca_id = Some(commit.ca_id.clone());
        request.assignment_method = Some(commit.method);
        request.assigned_by = commit.assigned_by.clone();
        request.assignment_state = match commit.method {
            AssignmentMethod::Auto => AssignmentState::AutoAssigned,
            AssignmentMethod::Manual | AssignmentMethod::ClientSpecified => {
                AssignmentState::ManualAssigned
            }
        };
        if let Some(score) = commit.score {
            request.auto_assignment_score = Some(score);
        }

        Ok(Some(request.clone()))
    }

    fn reassign(
        &self,
        id: &RequestId,
        commit: &AssignmentCommit,
    ) -> Result<ServiceRequest, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let request = inner.requests.get_mut(id).ok_or(RepositoryError::NotFound)?;

        request.ca_id = Some(commit.ca_id.clone());
        request.assignment_method = Some(commit.method);
        request.assigned_by = commit.assigned_by.clone();
        request.assignment_state = AssignmentState::ManualAssigned;
        // auto_assignment_score stays untouched for the audit trail.

        Ok(request.clone())
    }

    fn mark_pending_manual(&self, id: &RequestId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let request = inner.requests.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if request.assignment_state == AssignmentState::Unassigned {
            request.assignment_state = AssignmentState::PendingManual;
        }
        Ok(())
    }

    fn record_event(&self, event: AssignmentEvent) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.events.push(event);
        Ok(())
    }
}

/// Notifier that records outbound notices for inspection.
#[derive(Default, Clone)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}
