//! **sigdec** decodes bit-packed signalling messages into a tree of labelled fields. It knows
//! three families: CDMA2000 layer 3 (TLAC header plus message body), SCCP and GSM SMS TPDUs.
//! E.164 digit formatting is shared between them.
//!
//! * [Getting started](#getting-started)
//! * [The decoded tree](#the-decoded-tree)
//! * [Diagnostics](#diagnostics)
//! * [Context](#context)
//!     * [Reassembly](#reassembly)
//!     * [Associations](#associations)
//!     * [Labels](#labels)
//! * [Configuration](#configuration)
//! * [Code tables](#code-tables)
//!
//! # Getting started
//!
//! Everything goes through [`decode`]. It takes the protocol family, the complete message bytes,
//! an optional message type already known from an outer layer and a [`DecodeContext`].
//!
//! ```rust
//! use sigdec::{decode, DecodeContext, Protocol};
//! use sigdec::protocols::cdma2k::Cdma2kMessage;
//!
//! let ctx = DecodeContext::default();
//! let result = decode(Protocol::Cdma2k, &[0x06, 0x42, 0x17, 0x80], None, &ctx);
//!
//! assert_eq!(result.message, Some(Cdma2kMessage::Registration.into()));
//! println!("{}", result.root);
//! ```
//!
//! Each family also implements [`Grammar`], which takes a typed hint instead of a
//! [`MessageType`].
//!
//! ```rust
//! use sigdec::{DecodeContext, Grammar};
//! use sigdec::protocols::sccp::Sccp;
//!
//! let ctx = DecodeContext::default();
//! let result = Sccp::decode(&[0x10, 0x01, 0x02, 0x03], None, &ctx);
//! assert!(!result.diagnostics.is_empty());
//! ```
//!
//! # The decoded tree
//!
//! The result's `root` is a [`DecodedNode`]. Nodes hold [`DecodedField`]s and further nodes in
//! wire order. Every field knows its bit offset and width, its raw value and a rendering such as
//! `"Power-up (1)"`. Repeated structures are labelled with a 1-based index, e.g. `Header Record
//! [1]`.
//!
//! # Diagnostics
//!
//! Decoding never fails outright. Whatever went wrong is described by a [`Diagnostic`], attached
//! both to the node where it happened and to [`DecodeResult::diagnostics`]. The terminal
//! [`DecodeState`] says whether the message was walked to the end.
//!
//! Each diagnostic is also emitted as a `tracing` event at `warn` level. sigdec does not install a
//! subscriber.
//!
//! # Context
//!
//! A [`DecodeContext`] carries what one message needs to know about the others: the direction,
//! the endpoint pair, the shared [`ReassemblyTracker`] and [`AssociationResolver`], the
//! [`Lookup`] for labels and the [`DecodeOptions`]. Share one context (or its `Arc`ed parts)
//! across the messages of a capture.
//!
//! ## Reassembly
//!
//! Segmented SCCP messages (XUDT, XUDTS, LUDT, LUDTS) and concatenated short messages feed the
//! tracker. When the last missing fragment arrives, the result's [`Payload`] holds the complete
//! user data and `reassembled` is set.
//!
//! ## Associations
//!
//! Connection-oriented SCCP messages are mapped to an [`AssociationId`] through the resolver. The
//! default [`ConversationTable`] links a connection request to its confirm by local reference.
//!
//! ## Labels
//!
//! Built-in value tables can be overridden per field name.
//!
//! ```rust
//! use std::sync::Arc;
//! use sigdec::{decode, DecodeContext, OverrideTable, Protocol};
//!
//! let labels = OverrideTable::new().with(Protocol::Cdma2k, "REG_TYPE", 1, "Switched on");
//! let ctx = DecodeContext::default().with_lookup(Arc::new(labels));
//! let result = decode(Protocol::Cdma2k, &[0x06, 0x42, 0x17, 0x80], None, &ctx);
//!
//! let field = result.root.find_field("REG_TYPE").unwrap();
//! assert_eq!(field.rendering, "Switched on (1)");
//! ```
//!
//! # Configuration
//!
//! [`DecodeOptions`] can be read from TOML.
//!
//! ```toml
//! [sccp]
//! variant = "ansi"
//! reassemble = false
//!
//! [gsm_sms]
//! default_direction = "ms_to_sc"
//! ```
//!
//! # Code tables
//!
//! Closed sets of wire codes are enums deriving [`Dispatch`](derive@Dispatch).
//!
//! ```rust
//! #[derive(Debug, Clone, Copy, PartialEq, sigdec::Dispatch)]
//! enum Cause {
//!     #[sigdec(code = 0, rename = "No translation for an address of such nature")]
//!     NoTranslationForNature,
//!     #[sigdec(code = 1)]
//!     SubsystemCongestion,
//!     #[sigdec(fallback)]
//!     Unknown,
//! }
//!
//! use sigdec::Dispatch;
//! assert_eq!(Cause::classify(1), Some(Cause::SubsystemCongestion));
//! assert_eq!(Cause::SubsystemCongestion.label(), "Subsystem Congestion");
//! assert_eq!(Cause::classify(9), Some(Cause::Unknown));
//! ```

// Lets the derive macros refer to `sigdec::` from inside this crate too.
extern crate self as sigdec;

use std::fmt;

mod association;
mod config;
mod context;
mod cursor;
mod decoder;
pub mod e164;
mod error;
pub mod field;
pub mod protocols;
mod reassembly;
mod tree;
mod vals;

pub use association::{
    AssociationId, AssociationResolver, ConnectionEvent, ConversationTable, LocalReferences,
};
pub use config::{DecodeOptions, GsmSmsOptions, SccpOptions, SccpVariant};
pub use context::{DecodeContext, Direction, Endpoints};
pub use cursor::BitCursor;
pub use decoder::{DecodeState, Decoder, Failure};
pub use error::{ConfigError, CursorError, DecodeError, Diagnostic, DiagnosticKind};
pub use reassembly::{
    ConversationKey, Fragment, FragmentKey, FragmentOutcome, FragmentParams, ReassemblyEntry,
    ReassemblyResult, ReassemblyTracker, StoredFragment,
};
pub use sigdec_derive::Dispatch;
pub use tree::{Child, DecodedField, DecodedNode, FieldKind, RawValue};
pub use vals::{Dispatch, Lookup, NoOverrides, OverrideTable, ValueStrings};

use protocols::cdma2k::{Cdma2k, Cdma2kMessage};
use protocols::gsm_sms::{GsmSms, SmsMessage};
use protocols::sccp::{Sccp, SccpMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Cdma2k,
    Sccp,
    GsmSms,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Cdma2k => "CDMA2000",
            Protocol::Sccp => "SCCP",
            Protocol::GsmSms => "GSM SMS",
        };
        f.write_str(name)
    }
}

/// Alphabet of a piece of user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// GSM 03.38 default alphabet, 7 bits per character.
    Gsm7,
    /// 8-bit data.
    Octet,
    Ucs2,
}

/// The resolved type of a message, per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Cdma2k(Cdma2kMessage),
    Sccp(SccpMessage),
    GsmSms(SmsMessage),
}

impl MessageType {
    pub fn protocol(&self) -> Protocol {
        match self {
            MessageType::Cdma2k(_) => Protocol::Cdma2k,
            MessageType::Sccp(_) => Protocol::Sccp,
            MessageType::GsmSms(_) => Protocol::GsmSms,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageType::Cdma2k(m) => m.label(),
            MessageType::Sccp(m) => m.label(),
            MessageType::GsmSms(m) => m.label(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Cdma2kMessage> for MessageType {
    fn from(m: Cdma2kMessage) -> Self {
        MessageType::Cdma2k(m)
    }
}

impl From<SccpMessage> for MessageType {
    fn from(m: SccpMessage) -> Self {
        MessageType::Sccp(m)
    }
}

impl From<SmsMessage> for MessageType {
    fn from(m: SmsMessage) -> Self {
        MessageType::GsmSms(m)
    }
}

/// The value a downstream decoder for the payload would be chosen by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSelector {
    /// SCCP subsystem number.
    Ssn(u8),
    /// SMS application port.
    Port(u16),
    /// CDMA2000 data burst type.
    BurstType(u8),
}

/// User data isolated from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub selector: Option<PayloadSelector>,
    pub bytes: Vec<u8>,
    /// Set when `bytes` is the concatenation of several fragments.
    pub reassembled: bool,
}

#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub root: DecodedNode,
    /// Every diagnostic in the tree, in wire order.
    pub diagnostics: Vec<Diagnostic>,
    pub state: DecodeState,
    pub message: Option<MessageType>,
    pub payload: Option<Payload>,
    pub association: Option<AssociationId>,
}

impl DecodeResult {
    pub fn is_done(&self) -> bool {
        self.state == DecodeState::Done
    }

    pub fn has_diagnostic(&self, pred: impl Fn(&DiagnosticKind) -> bool) -> bool {
        self.diagnostics.iter().any(|d| pred(&d.kind))
    }
}

/// One message family.
pub trait Grammar {
    type Message: Copy + fmt::Debug + Into<MessageType>;

    const PROTOCOL: Protocol;

    /// Decodes one complete message. Never panics on malformed input.
    fn decode(buffer: &[u8], hint: Option<Self::Message>, ctx: &DecodeContext) -> DecodeResult;
}

/// Decodes `buffer` as a message of `protocol`.
///
/// A `hint` from another family is ignored.
pub fn decode(
    protocol: Protocol,
    buffer: &[u8],
    hint: Option<MessageType>,
    ctx: &DecodeContext,
) -> DecodeResult {
    if let Some(hint) = hint.filter(|h| h.protocol() != protocol) {
        tracing::debug!(%protocol, hint = %hint.protocol(), "ignoring hint for another protocol");
    }
    match protocol {
        Protocol::Cdma2k => {
            let hint = match hint {
                Some(MessageType::Cdma2k(m)) => Some(m),
                _ => None,
            };
            Cdma2k::decode(buffer, hint, ctx)
        }
        Protocol::Sccp => {
            let hint = match hint {
                Some(MessageType::Sccp(m)) => Some(m),
                _ => None,
            };
            Sccp::decode(buffer, hint, ctx)
        }
        Protocol::GsmSms => {
            let hint = match hint {
                Some(MessageType::GsmSms(m)) => Some(m),
                _ => None,
            };
            GsmSms::decode(buffer, hint, ctx)
        }
    }
}


#[cfg(test)]
mod compile_tests {
    #[test]
    fn run_all() {
        let t = trybuild::TestCases::new();
        t.pass("tests/should_pass/*.rs");
    }
}
