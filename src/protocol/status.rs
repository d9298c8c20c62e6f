//! Response status codes
//!
//! Every status byte maps to exactly one [`StatusOutcome`]. Non-error
//! statuses are handed back to the operation for interpretation; error
//! statuses are turned into errors by the codec.

// -----------------------------------------------------------------------------
// Non-error statuses
// -----------------------------------------------------------------------------
pub const NO_ERROR_STATUS: u8 = 0x00;
pub const NOT_PUT_REMOVED_REPLACED_STATUS: u8 = 0x01;
pub const KEY_DOES_NOT_EXIST_STATUS: u8 = 0x02;
pub const SUCCESS_WITH_PREVIOUS: u8 = 0x03;
pub const NOT_EXECUTED_WITH_PREVIOUS: u8 = 0x04;
pub const INVALID_ITERATION: u8 = 0x05;
pub const NO_ERROR_STATUS_COMPAT: u8 = 0x06;
pub const SUCCESS_WITH_PREVIOUS_COMPAT: u8 = 0x07;
pub const NOT_EXECUTED_WITH_PREVIOUS_COMPAT: u8 = 0x08;

// -----------------------------------------------------------------------------
// Error statuses
// -----------------------------------------------------------------------------
pub const INVALID_MAGIC_OR_MESSAGE_ID_STATUS: u8 = 0x81;
pub const UNKNOWN_COMMAND_STATUS: u8 = 0x82;
pub const UNKNOWN_VERSION_STATUS: u8 = 0x83;
pub const REQUEST_PARSING_ERROR_STATUS: u8 = 0x84;
pub const SERVER_ERROR_STATUS: u8 = 0x85;
pub const COMMAND_TIMEOUT_STATUS: u8 = 0x86;
pub const NODE_SUSPECTED: u8 = 0x87;
pub const ILLEGAL_LIFECYCLE_STATE: u8 = 0x88;

/// Classification of a status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// No error and no previous value follows
    Success,
    /// No error and a previous value follows the header
    SuccessWithPrevious,
    /// Error message follows; raised as `ServerError`
    ServerError,
    /// Error message follows; raised as `NodeSuspected`
    NodeSuspected,
    /// Error message follows; raised as `IllegalLifecycleState`
    IllegalLifecycle,
    /// Not a status this client understands
    Unknown,
}

/// Classify a status byte. Total over `0..=255`.
pub fn classify(status: u8) -> StatusOutcome {
    match status {
        SUCCESS_WITH_PREVIOUS
        | NOT_EXECUTED_WITH_PREVIOUS
        | SUCCESS_WITH_PREVIOUS_COMPAT
        | NOT_EXECUTED_WITH_PREVIOUS_COMPAT => StatusOutcome::SuccessWithPrevious,
        NO_ERROR_STATUS
        | NOT_PUT_REMOVED_REPLACED_STATUS
        | KEY_DOES_NOT_EXIST_STATUS
        | INVALID_ITERATION
        | NO_ERROR_STATUS_COMPAT => StatusOutcome::Success,
        INVALID_MAGIC_OR_MESSAGE_ID_STATUS
        | UNKNOWN_COMMAND_STATUS
        | UNKNOWN_VERSION_STATUS
        | REQUEST_PARSING_ERROR_STATUS
        | SERVER_ERROR_STATUS
        | COMMAND_TIMEOUT_STATUS => StatusOutcome::ServerError,
        NODE_SUSPECTED => StatusOutcome::NodeSuspected,
        ILLEGAL_LIFECYCLE_STATE => StatusOutcome::IllegalLifecycle,
        _ => StatusOutcome::Unknown,
    }
}

/// The operation was applied
pub fn is_success(status: u8) -> bool {
    matches!(
        status,
        NO_ERROR_STATUS | SUCCESS_WITH_PREVIOUS | NO_ERROR_STATUS_COMPAT | SUCCESS_WITH_PREVIOUS_COMPAT
    )
}

/// A conditional operation was not applied
pub fn is_not_executed(status: u8) -> bool {
    matches!(
        status,
        NOT_PUT_REMOVED_REPLACED_STATUS | NOT_EXECUTED_WITH_PREVIOUS | NOT_EXECUTED_WITH_PREVIOUS_COMPAT
    )
}

/// The key was not present
pub fn is_not_exist(status: u8) -> bool {
    status == KEY_DOES_NOT_EXIST_STATUS
}

/// A previous value follows the header
pub fn has_previous(status: u8) -> bool {
    classify(status) == StatusOutcome::SuccessWithPrevious
}

/// Server is running in compatibility mode; unmarshalled classes must pass
/// the allow list
pub fn has_compatibility(status: u8) -> bool {
    matches!(
        status,
        NO_ERROR_STATUS_COMPAT | SUCCESS_WITH_PREVIOUS_COMPAT | NOT_EXECUTED_WITH_PREVIOUS_COMPAT
    )
}

/// Error statuses caused by framing problems. Whatever is left on the
/// connection cannot be trusted afterwards.
pub fn desynchronizes_stream(status: u8) -> bool {
    matches!(
        status,
        INVALID_MAGIC_OR_MESSAGE_ID_STATUS
            | UNKNOWN_COMMAND_STATUS
            | UNKNOWN_VERSION_STATUS
            | REQUEST_PARSING_ERROR_STATUS
    )
}
