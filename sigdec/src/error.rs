use std::fmt;

/// Failure of a single [`BitCursor`](crate::BitCursor) read. The cursor position is left untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("reading {requested} bits at bit {position} exceeds the {available} bits available")]
    OutOfBounds {
        position: usize,
        requested: usize,
        available: usize,
    },
    #[error("byte read at bit {position} is not byte aligned")]
    Unaligned { position: usize },
}

/// Control flow inside a grammar procedure. Never escapes [`decode`](crate::decode): the engine
/// turns it into diagnostics and a terminal [`DecodeState`](crate::DecodeState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("buffer truncated")]
    Truncated,
    #[error("read of {requested} bits crosses the end of a declared record")]
    Overrun { requested: usize },
}

pub(crate) type Step<T> = Result<T, DecodeError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A non-fatal problem found while decoding untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("truncated")]
    Truncated,
    #[error("length mismatch: declared {declared_bits} bits, consumed {consumed_bits} bits")]
    LengthMismatch {
        declared_bits: usize,
        consumed_bits: usize,
    },
    #[error("unsupported message type {0}")]
    UnsupportedMessageType(u64),
    #[error("unsupported record type {0}")]
    UnsupportedRecordType(u64),
    #[error("malformed BCD digit")]
    MalformedBcd,
    #[error("total fragment count changed from {previous} to {current}")]
    InconsistentTotalHint { previous: u32, current: u32 },
    #[error("fragment {0} already received")]
    DuplicateSequence(u32),
    #[error("message type hint {hinted} disagrees with decoded {decoded}")]
    TypeHintMismatch { hinted: String, decoded: String },
    #[error("segment cannot be placed without its first segment")]
    UnplacedSegment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Where in the buffer the problem was found.
    pub bit_offset: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at bit {}", self.kind, self.bit_offset)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_includes_context() {
        let diag = Diagnostic {
            kind: DiagnosticKind::LengthMismatch {
                declared_bits: 16,
                consumed_bits: 24,
            },
            bit_offset: 40,
            message: "Header Record [1]".to_string(),
        };
        assert_eq!(
            diag.to_string(),
            "length mismatch: declared 16 bits, consumed 24 bits at bit 40: Header Record [1]"
        );
    }

    #[test]
    fn config_error_wraps_toml() {
        let err: ConfigError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
