use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::{
    AssociationResolver, ConversationTable, DecodeOptions, Lookup, NoOverrides, ReassemblyTracker,
};

/// Direction of a message relative to the mobile station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Mobile to network (MS to SC, reverse channels).
    #[serde(alias = "ms_to_sc")]
    Uplink,
    /// Network to mobile (SC to MS, forward channels).
    #[serde(alias = "sc_to_ms")]
    Downlink,
}

/// Opaque identities of the two ends of a conversation, e.g. point codes or addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Endpoints {
    pub src: u64,
    pub dst: u64,
}

impl Endpoints {
    pub fn new(src: u64, dst: u64) -> Self {
        Endpoints { src, dst }
    }

    pub fn reversed(self) -> Self {
        Endpoints {
            src: self.dst,
            dst: self.src,
        }
    }

    /// The same pair regardless of which end sent the message.
    pub fn unordered(self) -> Self {
        Endpoints {
            src: self.src.min(self.dst),
            dst: self.src.max(self.dst),
        }
    }
}

/// Everything a decode needs beyond the buffer itself: cross-message state and the shared
/// collaborators.
#[derive(Clone)]
pub struct DecodeContext {
    pub direction: Option<Direction>,
    pub endpoints: Endpoints,
    pub options: DecodeOptions,
    pub reassembly: Arc<ReassemblyTracker>,
    pub associations: Arc<dyn AssociationResolver>,
    pub lookup: Arc<dyn Lookup>,
}

impl Default for DecodeContext {
    fn default() -> Self {
        DecodeContext {
            direction: None,
            endpoints: Endpoints::default(),
            options: DecodeOptions::default(),
            reassembly: Arc::new(ReassemblyTracker::new()),
            associations: Arc::new(ConversationTable::new()),
            lookup: Arc::new(NoOverrides),
        }
    }
}

impl fmt::Debug for DecodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeContext")
            .field("direction", &self.direction)
            .field("endpoints", &self.endpoints)
            .field("options", &self.options)
            .field("pending_reassemblies", &self.reassembly.len())
            .finish_non_exhaustive()
    }
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<ReassemblyTracker>) -> Self {
        self.reassembly = tracker;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AssociationResolver>) -> Self {
        self.associations = resolver;
        self
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn Lookup>) -> Self {
        self.lookup = lookup;
        self
    }
}
