use thiserror::Error;

/// The single error kind raised while decoding or converting a module.
///
/// Positions are word offsets into the module's word stream, `end_index` exclusive.
/// Errors from dependency types are propagated unchanged, so the position always names the instruction that failed first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (words {start_index}..{end_index})")]
pub struct ConversionError {
    pub start_index: usize,
    pub end_index: usize,
    pub message: String,
}
impl ConversionError {
    /// An error pointing at a single instruction start.
    pub fn new(instruction_start_index: usize, message: impl Into<String>) -> Self {
        Self::spanning(instruction_start_index, instruction_start_index, message)
    }

    pub fn spanning(start_index: usize, end_index: usize, message: impl Into<String>) -> Self {
        Self {
            start_index,
            end_index,
            message: message.into(),
        }
    }
}
