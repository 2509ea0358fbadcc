use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::{AssociationId, Direction, Endpoints, Protocol, TextEncoding};

/// Identifies the conversation a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub endpoints: Endpoints,
    pub direction: Option<Direction>,
    pub association: Option<AssociationId>,
}

/// Identifies one logical message being reassembled. The fragment sequence is passed alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub protocol: Protocol,
    pub conversation: ConversationKey,
    pub message_reference: u32,
}

/// Per-fragment metadata needed to render a fragment on its own after reassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentParams {
    /// Length of the user data after its header, in septets or octets depending on `encoding`.
    pub user_data_length: u32,
    /// Bits of padding between the user data header and the first septet.
    pub fill_bits: u8,
    pub encoding: TextEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFragment {
    pub payload: Vec<u8>,
    pub params: Option<FragmentParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReassemblyEntry {
    pub expected_total_fragments: Option<u32>,
    pub received_fragments: BTreeMap<u32, StoredFragment>,
    pub is_complete: bool,
}

impl ReassemblyEntry {
    fn is_gap_free(&self, total: u32) -> bool {
        self.received_fragments.len() == total as usize
            && self
                .received_fragments
                .keys()
                .copied()
                .eq(0..total)
    }

    /// Re-evaluates completeness against the current total. A raised total reopens the entry.
    fn refresh(&mut self) -> bool {
        self.is_complete = self
            .expected_total_fragments
            .is_some_and(|total| self.is_gap_free(total));
        self.is_complete
    }

    fn assemble(&self) -> Vec<u8> {
        self.received_fragments
            .values()
            .flat_map(|fragment| fragment.payload.iter().copied())
            .collect()
    }
}

/// One fragment handed to [`ReassemblyTracker::add_fragment_with_params`].
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub sequence: u32,
    pub payload: &'a [u8],
    pub is_last: bool,
    pub total_hint: Option<u32>,
    pub params: Option<FragmentParams>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyResult {
    Complete(Vec<u8>),
    Incomplete,
    DuplicateSequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentOutcome {
    pub result: ReassemblyResult,
    /// Set when this fragment's total hint replaced a different, earlier one as `(previous,
    /// current)`.
    pub inconsistent_total: Option<(u32, u32)>,
}

/// Accumulates fragments per [`FragmentKey`].
///
/// Entries are locked individually, so conversations never contend with each other. Entries are
/// never evicted.
#[derive(Debug, Default)]
pub struct ReassemblyTracker {
    entries: DashMap<FragmentKey, ReassemblyEntry>,
}

impl ReassemblyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fragment(
        &self,
        key: FragmentKey,
        sequence: u32,
        payload: &[u8],
        is_last: bool,
        total_hint: Option<u32>,
    ) -> ReassemblyResult {
        let fragment = Fragment {
            sequence,
            payload,
            is_last,
            total_hint,
            params: None,
        };
        self.add_fragment_with_params(key, fragment).result
    }

    pub fn add_fragment_with_params(&self, key: FragmentKey, fragment: Fragment) -> FragmentOutcome {
        let mut entry = self.entries.entry(key).or_default();

        let mut inconsistent_total = None;
        let hint = fragment
            .total_hint
            .or(fragment.is_last.then(|| fragment.sequence.saturating_add(1)));
        if let Some(current) = hint {
            let recorded = entry.expected_total_fragments;
            match recorded {
                Some(previous) if previous != current => {
                    tracing::warn!(?key, previous, current, "total fragment count changed");
                    inconsistent_total = Some((previous, current));
                    entry.expected_total_fragments = Some(current);
                }
                Some(_) => {}
                None => entry.expected_total_fragments = Some(current),
            }
        }

        if entry.received_fragments.contains_key(&fragment.sequence) {
            entry.refresh();
            tracing::debug!(?key, sequence = fragment.sequence, "duplicate fragment");
            return FragmentOutcome {
                result: ReassemblyResult::DuplicateSequence,
                inconsistent_total,
            };
        }
        entry.received_fragments.insert(
            fragment.sequence,
            StoredFragment {
                payload: fragment.payload.to_vec(),
                params: fragment.params,
            },
        );

        let total = entry.expected_total_fragments;
        let result = match total {
            Some(total) if entry.refresh() => {
                tracing::debug!(?key, total, "reassembly complete");
                ReassemblyResult::Complete(entry.assemble())
            }
            _ => {
                tracing::debug!(
                    ?key,
                    sequence = fragment.sequence,
                    received = entry.received_fragments.len(),
                    "fragment stored"
                );
                ReassemblyResult::Incomplete
            }
        };
        FragmentOutcome {
            result,
            inconsistent_total,
        }
    }

    /// A snapshot of everything recorded for `key`.
    pub fn lookup_params(&self, key: &FragmentKey) -> Option<ReassemblyEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    pub fn is_complete(&self, key: &FragmentKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.is_complete)
    }

    /// The reassembled bytes, once every fragment is present.
    pub fn assembled(&self, key: &FragmentKey) -> Option<Vec<u8>> {
        let entry = self.entries.get(key)?;
        entry.is_complete.then(|| entry.assemble())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
