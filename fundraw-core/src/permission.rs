//! Runtime storage permissions.
//!
//! The platform owns the authorization state; [`PermissionGate`] only reads
//! it, once per attempt, and decides whether an action may run now, must wait
//! for a prompt, must first explain itself, or must abort.
//!
//! Prompts resolve through [`PendingAuthorization`], a future completed by the
//! platform's [`AuthorizationResponder`], instead of a listener registered
//! for the lifetime of the app.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

/// A named runtime permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read access to shared storage (background import).
    StorageRead,
    /// Write access to storage (snapshot export).
    StorageWrite,
}

impl Capability {
    /// Short label used in user-facing text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StorageRead => "Read",
            Self::StorageWrite => "Write",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageRead => f.write_str("storage read"),
            Self::StorageWrite => f.write_str("storage write"),
        }
    }
}

/// The platform's answer for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    /// Access allowed.
    Granted,
    /// Access refused.
    Denied,
    /// The user has not been asked yet.
    NotDetermined,
}

/// Completes a [`PendingAuthorization`].
#[derive(Debug)]
pub struct AuthorizationResponder {
    sender: oneshot::Sender<AuthorizationState>,
}

impl AuthorizationResponder {
    /// Deliver the user's decision. Returns `false` if nobody is waiting.
    pub fn respond(self, granted: bool) -> bool {
        let state = if granted {
            AuthorizationState::Granted
        } else {
            AuthorizationState::Denied
        };
        self.sender.send(state).is_ok()
    }
}

/// An authorization prompt that has been issued but not answered.
///
/// Resolves to [`AuthorizationState::Granted`] or
/// [`AuthorizationState::Denied`]. A prompt whose responder is dropped
/// resolves to `Denied`.
#[derive(Debug)]
#[must_use = "a pending authorization does nothing unless awaited"]
pub struct PendingAuthorization {
    capability: Capability,
    receiver: oneshot::Receiver<AuthorizationState>,
}

impl PendingAuthorization {
    /// Create a prompt and the handle that answers it.
    pub fn channel(capability: Capability) -> (AuthorizationResponder, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            AuthorizationResponder { sender },
            Self {
                capability,
                receiver,
            },
        )
    }

    /// A prompt that is already answered.
    pub fn resolved(capability: Capability, granted: bool) -> Self {
        let (responder, pending) = Self::channel(capability);
        responder.respond(granted);
        pending
    }

    /// The capability this prompt is for.
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.capability
    }
}

impl Future for PendingAuthorization {
    type Output = AuthorizationState;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.receiver.poll_unpin(cx) {
            Poll::Ready(Ok(AuthorizationState::Granted)) => Poll::Ready(AuthorizationState::Granted),
            Poll::Ready(Ok(_) | Err(oneshot::Canceled)) => Poll::Ready(AuthorizationState::Denied),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Explanation shown before access is requested again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rationale {
    capability: Capability,
}

impl Rationale {
    /// Rationale for a capability.
    #[must_use]
    pub const fn new(capability: Capability) -> Self {
        Self { capability }
    }

    /// The capability being explained.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Dialog title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        "FunDraw Requires Storage Permission"
    }

    /// Dialog body.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Access is Denied\n Enable the Storage {} Permission from Permission Manager",
            self.capability.label()
        )
    }
}

/// The platform's permission service.
pub trait PermissionPlatform: Send + Sync {
    /// Current state for a capability.
    fn authorization_state(&self, capability: Capability) -> AuthorizationState;

    /// Whether the user declined before and should see an explanation first.
    fn should_show_rationale(&self, capability: Capability) -> bool;

    /// Show the system prompt.
    fn request_authorization(&self, capability: Capability) -> PendingAuthorization;
}

/// Outcome of [`PermissionGate::check_and_request`].
#[derive(Debug)]
pub enum GateDecision {
    /// Access is granted; proceed now.
    Authorized,
    /// Show this rationale; no prompt was issued.
    RationaleRequired(Rationale),
    /// A prompt was issued; proceed when it resolves to `Granted`.
    Requested(PendingAuthorization),
    /// Access is refused; abort.
    Denied,
}

/// Decides whether a storage action may proceed.
#[derive(Clone)]
pub struct PermissionGate {
    platform: Arc<dyn PermissionPlatform>,
}

impl PermissionGate {
    /// Create a gate over a platform permission service.
    #[must_use]
    pub fn new(platform: Arc<dyn PermissionPlatform>) -> Self {
        Self { platform }
    }

    /// Check access for `capability`, prompting if the user was never asked.
    ///
    /// The platform state is read fresh on every call.
    pub fn check_and_request(&self, capability: Capability) -> GateDecision {
        let state = self.platform.authorization_state(capability);
        if state == AuthorizationState::Granted {
            return GateDecision::Authorized;
        }

        if self.platform.should_show_rationale(capability) {
            tracing::debug!("Showing rationale for {capability}");
            return GateDecision::RationaleRequired(Rationale::new(capability));
        }

        match state {
            AuthorizationState::Denied => {
                tracing::debug!("{capability} denied");
                GateDecision::Denied
            }
            AuthorizationState::NotDetermined | AuthorizationState::Granted => {
                tracing::debug!("Requesting {capability}");
                GateDecision::Requested(self.platform.request_authorization(capability))
            }
        }
    }
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct PermissionTable {
    states: HashMap<Capability, AuthorizationState>,
    rationale: HashSet<Capability>,
    auto_responses: HashMap<Capability, bool>,
    waiting: HashMap<Capability, Vec<AuthorizationResponder>>,
    prompts: HashMap<Capability, usize>,
}

/// In-process permission service for hosts without a platform prompt.
///
/// Every capability starts as [`AuthorizationState::NotDetermined`]. Prompts
/// either answer themselves (see [`InMemoryPermissions::auto_respond`]) or wait
/// for [`InMemoryPermissions::respond`].
#[derive(Debug, Default)]
pub struct InMemoryPermissions {
    table: Mutex<PermissionTable>,
}

impl InMemoryPermissions {
    /// Create a service where nothing has been asked yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with every capability granted.
    #[must_use]
    pub fn granted() -> Self {
        let permissions = Self::new();
        permissions.set_state(Capability::StorageRead, AuthorizationState::Granted);
        permissions.set_state(Capability::StorageWrite, AuthorizationState::Granted);
        permissions
    }

    fn table(&self) -> std::sync::MutexGuard<'_, PermissionTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the state for a capability.
    pub fn set_state(&self, capability: Capability, state: AuthorizationState) {
        self.table().states.insert(capability, state);
    }

    /// Mark whether a rationale must be shown for a capability.
    pub fn set_rationale(&self, capability: Capability, show: bool) {
        let mut table = self.table();
        if show {
            table.rationale.insert(capability);
        } else {
            table.rationale.remove(&capability);
        }
    }

    /// Answer future prompts for `capability` immediately.
    pub fn auto_respond(&self, capability: Capability, granted: bool) {
        self.table().auto_responses.insert(capability, granted);
    }

    /// Answer every waiting prompt for `capability` and record the decision.
    ///
    /// Returns how many prompts were answered.
    pub fn respond(&self, capability: Capability, granted: bool) -> usize {
        let waiting = {
            let mut table = self.table();
            table.states.insert(capability, decision_state(granted));
            table.waiting.remove(&capability).unwrap_or_default()
        };
        waiting
            .into_iter()
            .map(|responder| responder.respond(granted))
            .filter(|delivered| *delivered)
            .count()
    }

    /// How many prompts were issued for a capability.
    #[must_use]
    pub fn prompt_count(&self, capability: Capability) -> usize {
        self.table().prompts.get(&capability).copied().unwrap_or(0)
    }
}

fn decision_state(granted: bool) -> AuthorizationState {
    if granted {
        AuthorizationState::Granted
    } else {
        AuthorizationState::Denied
    }
}

impl PermissionPlatform for InMemoryPermissions {
    fn authorization_state(&self, capability: Capability) -> AuthorizationState {
        self.table()
            .states
            .get(&capability)
            .copied()
            .unwrap_or(AuthorizationState::NotDetermined)
    }

    fn should_show_rationale(&self, capability: Capability) -> bool {
        self.table().rationale.contains(&capability)
    }

    fn request_authorization(&self, capability: Capability) -> PendingAuthorization {
        let mut table = self.table();
        *table.prompts.entry(capability).or_insert(0) += 1;

        if let Some(&granted) = table.auto_responses.get(&capability) {
            table.states.insert(capability, decision_state(granted));
            return PendingAuthorization::resolved(capability, granted);
        }

        let (responder, pending) = PendingAuthorization::channel(capability);
        table.waiting.entry(capability).or_default().push(responder);
        pending
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    fn gate(platform: &Arc<InMemoryPermissions>) -> PermissionGate {
        PermissionGate::new(Arc::clone(platform) as Arc<dyn PermissionPlatform>)
    }

    #[test]
    fn test_granted_is_authorized_without_prompt() {
        let platform = Arc::new(InMemoryPermissions::granted());
        let decision = gate(&platform).check_and_request(Capability::StorageWrite);
        assert!(matches!(decision, GateDecision::Authorized));
        assert_eq!(platform.prompt_count(Capability::StorageWrite), 0);
    }

    #[test]
    fn test_not_determined_prompts_and_resolves_later() {
        let platform = Arc::new(InMemoryPermissions::new());
        let GateDecision::Requested(pending) =
            gate(&platform).check_and_request(Capability::StorageWrite)
        else {
            panic!("expected a prompt");
        };
        assert_eq!(pending.capability(), Capability::StorageWrite);
        assert_eq!(platform.prompt_count(Capability::StorageWrite), 1);

        assert_eq!(platform.respond(Capability::StorageWrite, true), 1);
        assert_eq!(block_on(pending), AuthorizationState::Granted);
        assert_eq!(
            platform.authorization_state(Capability::StorageWrite),
            AuthorizationState::Granted
        );
    }

    #[test]
    fn test_rationale_suppresses_prompt() {
        let platform = Arc::new(InMemoryPermissions::new());
        platform.set_state(Capability::StorageWrite, AuthorizationState::Denied);
        platform.set_rationale(Capability::StorageWrite, true);

        let decision = gate(&platform).check_and_request(Capability::StorageWrite);
        let GateDecision::RationaleRequired(rationale) = decision else {
            panic!("expected rationale");
        };
        assert_eq!(rationale.title(), "FunDraw Requires Storage Permission");
        assert_eq!(
            rationale.message(),
            "Access is Denied\n Enable the Storage Write Permission from Permission Manager"
        );
        assert_eq!(platform.prompt_count(Capability::StorageWrite), 0);
    }

    #[test]
    fn test_denied_aborts_without_prompt() {
        let platform = Arc::new(InMemoryPermissions::new());
        platform.set_state(Capability::StorageWrite, AuthorizationState::Denied);
        let decision = gate(&platform).check_and_request(Capability::StorageWrite);
        assert!(matches!(decision, GateDecision::Denied));
        assert_eq!(platform.prompt_count(Capability::StorageWrite), 0);
    }

    #[test]
    fn test_state_is_read_on_every_call() {
        let platform = Arc::new(InMemoryPermissions::new());
        let gate = gate(&platform);
        platform.set_state(Capability::StorageRead, AuthorizationState::Denied);
        assert!(matches!(
            gate.check_and_request(Capability::StorageRead),
            GateDecision::Denied
        ));
        platform.set_state(Capability::StorageRead, AuthorizationState::Granted);
        assert!(matches!(
            gate.check_and_request(Capability::StorageRead),
            GateDecision::Authorized
        ));
    }

    #[test]
    fn test_dropped_responder_resolves_denied() {
        let (responder, pending) = PendingAuthorization::channel(Capability::StorageRead);
        drop(responder);
        assert_eq!(block_on(pending), AuthorizationState::Denied);
    }

    #[test]
    fn test_auto_respond() {
        let platform = Arc::new(InMemoryPermissions::new());
        platform.auto_respond(Capability::StorageWrite, false);
        let GateDecision::Requested(pending) =
            gate(&platform).check_and_request(Capability::StorageWrite)
        else {
            panic!("expected a prompt");
        };
        assert_eq!(block_on(pending), AuthorizationState::Denied);
        assert_eq!(
            platform.authorization_state(Capability::StorageWrite),
            AuthorizationState::Denied
        );
    }
}
