use std::mem;

use crate::e164;
use crate::error::Step;
use crate::field::{self, is_valid_bcd};
use crate::vals::render_labelled;
use crate::{
    AssociationId, BitCursor, Child, CursorError, DecodeContext, DecodeError, DecodeResult,
    DecodedField, DecodedNode, Diagnostic, DiagnosticKind, FieldKind, MessageType, Payload,
    Protocol, RawValue, ValueStrings,
};

/// Where a single message decode currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Start,
    HeaderDecoded,
    BodyDecoding,
    OptionalParametersDecoding,
    Done,
    Failed(Failure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Truncated,
    LengthMismatch,
}

/// Builds a [`DecodedNode`] tree while walking a buffer with a [`BitCursor`].
///
/// Grammar procedures call the field methods in wire order. A read that runs off the end of the
/// buffer attaches a `Truncated` diagnostic to the innermost open node and returns
/// [`DecodeError::Truncated`], which procedures pass upwards with `?`. Reads that cross the end of
/// a [`record`](Self::record) are caught by that record.
pub struct Decoder<'a> {
    cursor: BitCursor<'a>,
    root: DecodedNode,
    stack: Vec<DecodedNode>,
    diagnostics: Vec<Diagnostic>,
    state: DecodeState,
    protocol: Protocol,
    ctx: &'a DecodeContext,
}

impl<'a> Decoder<'a> {
    pub fn new(
        protocol: Protocol,
        buffer: &'a [u8],
        ctx: &'a DecodeContext,
        label: impl Into<String>,
    ) -> Self {
        Decoder {
            cursor: BitCursor::new(buffer),
            root: DecodedNode::new(label, 0),
            stack: Vec::new(),
            diagnostics: Vec::new(),
            state: DecodeState::Start,
            protocol,
            ctx,
        }
    }

    pub fn context(&self) -> &'a DecodeContext {
        self.ctx
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn cursor(&self) -> &BitCursor<'a> {
        &self.cursor
    }

    pub fn position(&self) -> usize {
        self.cursor.bit_position()
    }

    pub fn remaining_bits(&self) -> usize {
        self.cursor.remaining_bits()
    }

    pub fn remaining_bytes(&self) -> usize {
        self.cursor.remaining_bits() / 8
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    pub fn set_state(&mut self, state: DecodeState) {
        tracing::trace!(from = ?self.state, to = ?state, "decode state");
        self.state = state;
    }

    fn current(&mut self) -> &mut DecodedNode {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    fn fail(&mut self, err: CursorError) -> DecodeError {
        match err {
            CursorError::OutOfBounds {
                position,
                requested,
                available,
            } => {
                if self.cursor.limit() < self.cursor.buffer_bits() {
                    return DecodeError::Overrun { requested };
                }
                let msg = format!("{requested} bits requested, {available} available");
                self.diag_at(DiagnosticKind::Truncated, position, msg);
                DecodeError::Truncated
            }
            CursorError::Unaligned { position } => {
                self.diag_at(DiagnosticKind::Truncated, position, "unaligned byte read");
                DecodeError::Truncated
            }
        }
    }

    /// Records a diagnostic at the current position on the innermost open node.
    pub fn diag(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let position = self.position();
        self.diag_at(kind, position, message);
    }

    pub fn diag_at(&mut self, kind: DiagnosticKind, bit_offset: usize, message: impl Into<String>) {
        let diag = Diagnostic {
            kind,
            bit_offset,
            message: message.into(),
        };
        tracing::warn!(protocol = %self.protocol, %diag, "diagnostic");
        self.current().diagnostics.push(diag.clone());
        self.diagnostics.push(diag);
    }

    pub fn push_field(&mut self, field: DecodedField) {
        tracing::trace!(name = field.name, rendering = %field.rendering, "field");
        self.current().children.push(Child::Field(field));
    }

    fn relabel(&self, field: &mut DecodedField, value: u64) {
        if let Some(label) = self.ctx.lookup.label(self.protocol, field.name, value) {
            field.rendering = render_labelled(Some(&label), value);
        }
    }

    pub fn uint(&mut self, name: &'static str, width: usize) -> Step<u64> {
        self.uint_with(name, width, None)
    }

    /// An unsigned field labelled from `vals`.
    pub fn uint_vals(&mut self, name: &'static str, width: usize, vals: ValueStrings) -> Step<u64> {
        self.uint_with(name, width, Some(vals))
    }

    fn uint_with(
        &mut self,
        name: &'static str,
        width: usize,
        vals: Option<ValueStrings>,
    ) -> Step<u64> {
        let mut field =
            field::decode_uint(&mut self.cursor, name, width, vals).map_err(|e| self.fail(e))?;
        let value = field.value().unwrap_or_default();
        self.relabel(&mut field, value);
        self.push_field(field);
        Ok(value)
    }

    pub fn flag(&mut self, name: &'static str) -> Step<bool> {
        self.flag_labelled(name, ("Yes", "No"))
    }

    pub fn flag_labelled(&mut self, name: &'static str, labels: (&str, &str)) -> Step<bool> {
        let field =
            field::decode_flag(&mut self.cursor, name, labels).map_err(|e| self.fail(e))?;
        let set = field.value() == Some(1);
        self.push_field(field);
        Ok(set)
    }

    /// Consumes `width` bits without adding a field. Pair with [`annotate`](Self::annotate).
    pub fn take(&mut self, width: usize) -> Step<u64> {
        self.cursor.read_bits(width).map_err(|e| self.fail(e))
    }

    /// A little-endian integer of `n_bytes` octets (at most 8).
    pub fn uint_le(&mut self, name: &'static str, n_bytes: usize) -> Step<u64> {
        let start = self.position();
        let be = self.take(n_bytes * 8)?;
        let value = (0..n_bytes).fold(0, |acc, i| (acc << 8) | ((be >> (8 * i)) & 0xFF));
        self.computed(name, start, value);
        Ok(value)
    }

    /// Adds an integer field derived from everything read since `start`.
    pub fn computed(&mut self, name: &'static str, start: usize, value: u64) {
        let mut field = DecodedField {
            name,
            bit_offset: start,
            bit_width: self.position().saturating_sub(start),
            raw: RawValue::UInt(value),
            rendering: value.to_string(),
            kind: FieldKind::UInt,
        };
        self.relabel(&mut field, value);
        self.push_field(field);
    }

    /// Looks at the next `width` bits without consuming them.
    pub fn peek(&mut self, width: usize) -> Step<u64> {
        self.cursor.peek_bits(width).map_err(|e| self.fail(e))
    }

    /// One octet of swapped-nibble BCD. Returns the raw octet.
    pub fn bcd_pair(&mut self, name: &'static str) -> Step<u8> {
        let field =
            field::decode_bcd_digit_pair(&mut self.cursor, name).map_err(|e| self.fail(e))?;
        let octet = field.value().unwrap_or_default() as u8;
        let offset = field.bit_offset;
        self.push_field(field);
        if !is_valid_bcd(octet) {
            self.diag_at(DiagnosticKind::MalformedBcd, offset, format!("{name} = {octet:#04x}"));
        }
        Ok(octet)
    }

    /// Renders `count` telephony BCD digits read from `start`. A filler nibble inside the count
    /// is kept as `?` and flagged.
    pub fn tbcd_digits(&mut self, name: &str, start: usize, octets: &[u8], count: usize) -> String {
        if let Some(index) = e164::filler_position(octets, count) {
            let nibble_offset = if index % 2 == 0 { 4 } else { 0 };
            let offset = start + index / 2 * 8 + nibble_offset;
            let msg = format!("{name}: filler at digit {}", index + 1);
            self.diag_at(DiagnosticKind::MalformedBcd, offset, msg);
        }
        e164::unpack_digits(octets, Some(count))
    }

    pub fn bitmap(&mut self, name: &'static str, width: usize) -> Step<()> {
        let field = field::decode_signed_variable_length_bitmap(&mut self.cursor, name, width)
            .map_err(|e| self.fail(e))?;
        self.push_field(field);
        Ok(())
    }

    pub fn bytes(&mut self, name: &'static str, n: usize) -> Step<Vec<u8>> {
        let field = field::decode_byte_run(&mut self.cursor, name, n).map_err(|e| self.fail(e))?;
        let bytes = field.raw.as_bytes().map(<[u8]>::to_vec).unwrap_or_default();
        self.push_field(field);
        Ok(bytes)
    }

    /// Every whole byte left before the limit.
    pub fn rest(&mut self, name: &'static str) -> Step<Vec<u8>> {
        let n = self.remaining_bytes();
        self.bytes(name, n)
    }

    /// Consumes `width` bits as a padding field.
    pub fn reserved(&mut self, width: usize) -> Step<()> {
        self.skip_as(width, "Reserved", FieldKind::Reserved)
    }

    fn skip_as(&mut self, width: usize, name: &'static str, kind: FieldKind) -> Step<()> {
        if width == 0 {
            return Ok(());
        }
        let bit_offset = self.position();
        let raw = if width <= 64 {
            RawValue::UInt(self.cursor.read_bits(width).map_err(|e| self.fail(e))?)
        } else {
            RawValue::Bytes(self.cursor.read_bit_run(width).map_err(|e| self.fail(e))?)
        };
        self.push_field(DecodedField {
            name,
            bit_offset,
            bit_width: width,
            raw,
            rendering: format!("{width} bits"),
            kind,
        });
        Ok(())
    }

    /// Pads up to the next byte boundary.
    pub fn align(&mut self) -> Step<()> {
        let pad = ((8 - self.position() % 8) % 8).min(self.remaining_bits());
        self.reserved(pad)
    }

    /// Adds a text field covering everything read since `start`, e.g. digits assembled from
    /// several nibbles.
    pub fn annotate(&mut self, name: &'static str, start: usize, rendering: String) {
        let end = self.position();
        let buffer = self.cursor.buffer();
        let raw = buffer[(start / 8).min(buffer.len())..end.div_ceil(8).min(buffer.len())].to_vec();
        self.push_field(DecodedField {
            name,
            bit_offset: start,
            bit_width: end.saturating_sub(start),
            raw: RawValue::Bytes(raw),
            rendering,
            kind: FieldKind::Text,
        });
    }

    fn open(&mut self, label: impl Into<String>) {
        let node = DecodedNode::new(label, self.position());
        self.stack.push(node);
    }

    fn close(&mut self) {
        if let Some(mut node) = self.stack.pop() {
            node.bit_width = self.position().saturating_sub(node.bit_offset);
            self.current().children.push(Child::Node(node));
        }
    }

    /// Runs `f` inside a new child node.
    pub fn subtree<T>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Step<T>,
    ) -> Step<T> {
        self.open(label);
        let ret = f(self);
        self.close();
        ret
    }

    /// Runs `f` inside a new child node whose wire length is `declared_bytes`.
    ///
    /// On return the cursor sits exactly at the declared end. Unused bits are covered by a
    /// `Reserved` field. If `f` tries to read past the declared end, a `LengthMismatch` is recorded
    /// on the node and `Ok(None)` is returned.
    pub fn record<T>(
        &mut self,
        label: impl Into<String>,
        declared_bytes: usize,
        f: impl FnOnce(&mut Self) -> Step<T>,
    ) -> Step<Option<T>> {
        self.open(label);
        let ret = self.bounded(declared_bytes, f);
        self.close();
        ret
    }

    /// Like [`record`](Self::record), but the fields land in the current node.
    pub fn bounded<T>(
        &mut self,
        declared_bytes: usize,
        f: impl FnOnce(&mut Self) -> Step<T>,
    ) -> Step<Option<T>> {
        let start = self.position();
        let declared_bits = declared_bytes.saturating_mul(8);
        let declared_end = start.saturating_add(declared_bits);

        let outer = self.cursor.set_limit(declared_end.min(self.cursor.limit()));
        let end = self.cursor.limit();
        let ret = f(self);

        let ret = match ret {
            Ok(value) => {
                let pad = end - self.position();
                self.reserved(pad).map(|_| Some(value))
            }
            Err(DecodeError::Overrun { requested }) => {
                let consumed_bits = self.position() - start + requested;
                self.diag_at(
                    DiagnosticKind::LengthMismatch {
                        declared_bits,
                        consumed_bits,
                    },
                    start,
                    "record longer than declared",
                );
                let undecoded = end - self.position();
                self.skip_as(undecoded, "Undecoded", FieldKind::Bitmap)
                    .map(|_| None)
            }
            Err(e) => Err(e),
        };
        self.cursor.set_limit(outer);

        match ret {
            Ok(_) if declared_end > end => {
                if end < self.cursor.buffer_bits() {
                    Err(DecodeError::Overrun {
                        requested: declared_end - end,
                    })
                } else {
                    let msg = format!("declared {declared_bytes} bytes");
                    self.diag(DiagnosticKind::Truncated, msg);
                    Err(DecodeError::Truncated)
                }
            }
            other => other,
        }
    }

    /// Decodes a structure found elsewhere in the buffer, e.g. through a pointer, with a second
    /// cursor. The main cursor then moves forward past the structure if it ended further along.
    pub fn detour<T>(
        &mut self,
        label: impl Into<String>,
        bit_offset: usize,
        f: impl FnOnce(&mut Self) -> Step<T>,
    ) -> Step<T> {
        let fork = self.cursor.fork_at(bit_offset);
        let mut main = mem::replace(&mut self.cursor, fork);
        let ret = self.subtree(label, f);
        let reached = self.cursor.bit_position();
        mem::swap(&mut self.cursor, &mut main);
        self.cursor.advance_to(reached);
        ret
    }

    /// Settles the final state from the outcome of the whole grammar procedure.
    pub fn conclude(&mut self, outcome: Step<()>) {
        let state = match outcome {
            Ok(()) => match self.state {
                DecodeState::Failed(failure) => DecodeState::Failed(failure),
                _ => DecodeState::Done,
            },
            Err(DecodeError::Truncated) => DecodeState::Failed(Failure::Truncated),
            Err(DecodeError::Overrun { requested }) => {
                let consumed = self.position() + requested;
                self.diag(
                    DiagnosticKind::LengthMismatch {
                        declared_bits: self.cursor.buffer_bits(),
                        consumed_bits: consumed,
                    },
                    "message longer than its buffer",
                );
                DecodeState::Failed(Failure::LengthMismatch)
            }
        };
        self.set_state(state);
    }

    pub fn finish(mut self) -> (DecodedNode, Vec<Diagnostic>, DecodeState) {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root.bit_width = self.position();
        (self.root, self.diagnostics, self.state)
    }

    pub fn into_result(
        self,
        message: Option<MessageType>,
        payload: Option<Payload>,
        association: Option<AssociationId>,
    ) -> DecodeResult {
        let (root, diagnostics, state) = self.finish();
        DecodeResult {
            root,
            diagnostics,
            state,
            message,
            payload,
            association,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_with<T>(
        buffer: &[u8],
        f: impl FnOnce(&mut Decoder) -> Step<T>,
    ) -> (Step<T>, DecodedNode, Vec<Diagnostic>, usize) {
        let ctx = DecodeContext::default();
        let mut dec = Decoder::new(Protocol::Cdma2k, buffer, &ctx, "Test");
        let ret = f(&mut dec);
        let position = dec.position();
        let (root, diags, _) = dec.finish();
        (ret, root, diags, position)
    }

    #[test]
    fn record_pads_to_declared_end() {
        let (ret, root, diags, position) = decode_with(&[0xAB, 0xCD, 0xEF, 0x01], |dec| {
            dec.record("Rec", 3, |dec| dec.uint("A", 4))?;
            dec.uint("Next", 8)
        });
        assert_eq!(ret, Ok(0x01));
        assert_eq!(position, 32);
        assert!(diags.is_empty());

        let rec = root.node("Rec").unwrap();
        assert_eq!(rec.bit_width, 24);
        let pad = rec.field("Reserved").unwrap();
        assert_eq!((pad.bit_offset, pad.bit_width), (4, 20));
        assert_eq!(pad.kind, FieldKind::Reserved);
    }

    #[test]
    fn record_overrun_is_a_length_mismatch() {
        let (ret, root, diags, _) = decode_with(&[0xAB, 0xCD, 0xEF], |dec| {
            let inner = dec.record("Rec", 1, |dec| {
                dec.uint("A", 4)?;
                dec.uint("B", 8)
            })?;
            assert_eq!(inner, None);
            dec.uint("Next", 16)
        });
        assert_eq!(ret, Ok(0xCDEF));
        assert_eq!(
            diags[0].kind,
            DiagnosticKind::LengthMismatch {
                declared_bits: 8,
                consumed_bits: 12
            }
        );
        let rec = root.node("Rec").unwrap();
        assert_eq!(rec.diagnostics.len(), 1);
        assert_eq!(rec.field("Undecoded").map(|f| f.bit_width), Some(4));
    }

    #[test]
    fn truncation_attaches_to_innermost_node() {
        let (ret, root, diags, _) = decode_with(&[0xFF], |dec| {
            dec.uint("A", 4)?;
            dec.subtree("Outer", |dec| dec.subtree("Inner", |dec| dec.uint("B", 8)))
        });
        assert_eq!(ret, Err(DecodeError::Truncated));
        assert_eq!(diags.len(), 1);
        let inner = root.find_node("Inner").unwrap();
        assert_eq!(inner.diagnostics[0].kind, DiagnosticKind::Truncated);
        assert!(root.node("Outer").unwrap().diagnostics.is_empty());
        assert_eq!(root.field("A").and_then(DecodedField::value), Some(0xF));
    }

    #[test]
    fn record_past_buffer_end_is_truncated() {
        let (ret, root, _, position) =
            decode_with(&[0x01, 0x02], |dec| dec.record("Rec", 5, |dec| dec.uint("A", 8)));
        assert_eq!(ret, Err(DecodeError::Truncated));
        assert_eq!(position, 16);
        let rec = root.node("Rec").unwrap();
        assert_eq!(rec.diagnostics[0].kind, DiagnosticKind::Truncated);
    }

    #[test]
    fn nested_record_overrunning_its_parent() {
        let (ret, root, diags, _) = decode_with(&[0x01, 0x02, 0x03, 0x04], |dec| {
            dec.record("Outer", 2, |dec| dec.record("Inner", 3, |dec| dec.uint("A", 8)))?;
            dec.uint("Next", 8)
        });
        assert_eq!(ret, Ok(0x03));
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            diags[0].kind,
            DiagnosticKind::LengthMismatch {
                declared_bits: 16,
                consumed_bits: 24
            }
        ));
        assert!(root.node("Outer").unwrap().node("Inner").is_some());
    }

    #[test]
    fn malformed_bcd_is_flagged_but_kept() {
        let (ret, root, diags, _) = decode_with(&[0x21, 0x3F], |dec| {
            dec.bcd_pair("D1")?;
            dec.bcd_pair("D2")
        });
        assert_eq!(ret, Ok(0x3F));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::MalformedBcd);
        assert_eq!(diags[0].bit_offset, 8);
        assert_eq!(root.field("D2").map(|f| f.rendering.as_str()), Some("f3"));
    }

    #[test]
    fn filler_between_digits_is_flagged() {
        let (ret, _, diags, _) = decode_with(&[0x21, 0x4F, 0x65], |dec| {
            let start = dec.position();
            let octets = [dec.take(8)? as u8, dec.take(8)? as u8, dec.take(8)? as u8];
            Ok(dec.tbcd_digits("Digits", start, &octets, 6))
        });
        assert_eq!(ret.as_deref(), Ok("12?456"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::MalformedBcd);
        assert_eq!(diags[0].bit_offset, 12);
    }

    #[test]
    fn detour_reads_elsewhere() {
        let (ret, root, _, position) = decode_with(&[0x02, 0x00, 0x7E, 0x55], |dec| {
            let ptr = dec.uint("Pointer", 8)? as usize;
            let target = dec.detour("Target", ptr * 8, |dec| dec.uint("Value", 8))?;
            Ok(target)
        });
        assert_eq!(ret, Ok(0x7E));
        assert_eq!(position, 24);
        assert_eq!(root.node("Target").map(|n| n.byte_offset()), Some(2));
    }

    #[test]
    fn align_emits_reserved() {
        let (_, root, _, position) = decode_with(&[0xFF, 0xFF], |dec| {
            dec.uint("A", 3)?;
            dec.align()?;
            dec.align()
        });
        assert_eq!(position, 8);
        let fields: Vec<_> = root.fields().map(|f| (f.name, f.bit_width)).collect();
        assert_eq!(fields, [("A", 3), ("Reserved", 5)]);
    }

    #[test]
    fn bounded_pads_in_place() {
        let (ret, root, _, position) = decode_with(&[0x05, 0xFF, 0xFF, 0x09], |dec| {
            dec.subtree("Param", |dec| dec.bounded(3, |dec| dec.uint("A", 8)))?;
            dec.uint("Next", 8)
        });
        assert_eq!(ret, Ok(0x09));
        assert_eq!(position, 32);
        let param = root.node("Param").unwrap();
        assert_eq!(param.nodes().count(), 0);
        assert_eq!(param.field("Reserved").map(|f| f.bit_width), Some(16));
    }

    #[test]
    fn little_endian_integers() {
        let (ret, root, _, _) = decode_with(&[0x01, 0x02, 0x03], |dec| dec.uint_le("Ref", 3));
        assert_eq!(ret, Ok(0x030201));
        let field = root.field("Ref").unwrap();
        assert_eq!((field.bit_offset, field.bit_width), (0, 24));
        assert_eq!(field.rendering, "197121");
    }

    #[test]
    fn conclude_tracks_failures() {
        let ctx = DecodeContext::default();
        let mut dec = Decoder::new(Protocol::Sccp, &[], &ctx, "Test");
        let outcome = dec.uint("A", 1).map(|_| ());
        dec.conclude(outcome);
        assert_eq!(dec.state(), DecodeState::Failed(Failure::Truncated));

        let mut dec = Decoder::new(Protocol::Sccp, &[1], &ctx, "Test");
        let outcome = dec.uint("A", 8).map(|_| ());
        dec.conclude(outcome);
        assert_eq!(dec.state(), DecodeState::Done);
    }
}
