use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::Endpoints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssociationId(pub u64);

/// What a connection-oriented message does to its association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Connection request.
    Open,
    /// Connection confirm.
    Confirm,
    /// Data, acknowledgement, reset and the like.
    Continue,
    /// Released or release complete.
    Release,
}

/// The local references carried by one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalReferences {
    pub source: Option<u32>,
    pub destination: Option<u32>,
}

/// Maps connection-oriented messages to a stable association handle.
pub trait AssociationResolver: Send + Sync {
    fn resolve(
        &self,
        endpoints: &Endpoints,
        refs: LocalReferences,
        event: ConnectionEvent,
    ) -> AssociationId;

    /// Remembers a subsystem number seen on the association.
    fn record_ssn(&self, _id: AssociationId, _ssn: u8) {}

    /// The subsystem number remembered for the association, if any.
    fn ssn(&self, _id: AssociationId) -> Option<u8> {
        None
    }
}

/// Links a connection request's source reference with the confirm's references so that every
/// message of one connection resolves to the same association.
#[derive(Debug, Default)]
pub struct ConversationTable {
    next: AtomicU64,
    by_reference: DashMap<(Endpoints, u32), AssociationId>,
    ssns: DashMap<AssociationId, u8>,
}

impl ConversationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.next.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate(&self) -> AssociationId {
        AssociationId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl AssociationResolver for ConversationTable {
    fn resolve(
        &self,
        endpoints: &Endpoints,
        refs: LocalReferences,
        event: ConnectionEvent,
    ) -> AssociationId {
        let pair = endpoints.unordered();
        let known = || {
            [refs.destination, refs.source]
                .into_iter()
                .flatten()
                .find_map(|r| self.by_reference.get(&(pair, r)).map(|id| *id))
        };
        // A request always starts a new association, even when its reference is being reused.
        let id = match event {
            ConnectionEvent::Open => self.allocate(),
            _ => known().unwrap_or_else(|| self.allocate()),
        };
        for r in [refs.source, refs.destination].into_iter().flatten() {
            self.by_reference.insert((pair, r), id);
        }
        tracing::debug!(?event, ?refs, id = id.0, "resolved association");
        id
    }

    fn record_ssn(&self, id: AssociationId, ssn: u8) {
        self.ssns.entry(id).or_insert(ssn);
    }

    fn ssn(&self, id: AssociationId) -> Option<u8> {
        self.ssns.get(&id).map(|ssn| *ssn)
    }
}
