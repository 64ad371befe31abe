use thiserror::Error;

/// Everything that can go wrong turning a query datagram into a response.
///
/// None of these leave any state behind; a failure only affects the message
/// being processed.
#[derive(Debug, Error, PartialEq)]
pub enum MessageError {
    #[error("malformed name at offset {offset}: {reason}")]
    MalformedName { offset: usize, reason: &'static str },

    #[error("label of {0} bytes exceeds 63 bytes: {1}")]
    LabelTooLong(usize, String),

    #[error("name of {0} bytes exceeds 255 bytes")]
    NameTooLong(usize),

    #[error("compression offset {0} does not fit in 14 bits")]
    OffsetOutOfRange(usize),

    #[error("header needs 12 bytes, got {0}")]
    TruncatedHeader(usize),

    #[error("question section truncated at offset {0}")]
    TruncatedQuestion(usize),

    #[error("no zone for {0}")]
    ZoneNotFound(String),

    #[error("zone {0} has no {1} records")]
    RecordTypeNotFound(String, crate::Type),

    #[error("invalid address literal: {0:?}")]
    InvalidAddressLiteral(String),

    #[error("{0} answers do not fit in a 16 bit answer count")]
    TooManyAnswers(usize),
}
