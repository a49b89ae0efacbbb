use thiserror::Error;

/// Failure modes of the byte reader and ABC decoder.
///
/// These are non-recoverable for the program being decoded: the caller of
/// [`crate::AbcFile::decode`] gets one of these back and the decode attempt
/// is abandoned.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    #[error("unexpected end of ABC data at offset {offset} (wanted {wanted} more byte(s))")]
    Truncated { offset: usize, wanted: usize },

    #[error("invalid UTF-8 in string constant at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("variable-length integer at offset {offset} did not terminate within 5 bytes")]
    MalformedVarInt { offset: usize },

    #[error("unknown multiname kind byte 0x{kind:02x} at offset {offset}")]
    InvalidMultinameKind { offset: usize, kind: u8 },

    #[error("unknown namespace kind byte 0x{kind:02x} at offset {offset}")]
    InvalidNamespaceKind { offset: usize, kind: u8 },

    #[error("unknown trait kind {kind} at offset {offset}")]
    InvalidTraitKind { offset: usize, kind: u8 },

    #[error("unknown constant-pool kind 0x{kind:02x} for default value at offset {offset}")]
    InvalidConstantKind { offset: usize, kind: u8 },
}
