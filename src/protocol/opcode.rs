//! Operation codes
//!
//! Every request op code is paired with a response op code one above it.
//! A response carrying any other code is a protocol violation unless it is
//! [`ERROR_RESPONSE`].

/// Generic error response, sent instead of the expected response code
pub const ERROR_RESPONSE: u8 = 0x50;

/// Pushed cache entry events
pub const CACHE_ENTRY_CREATED_EVENT_RESPONSE: u8 = 0x60;
pub const CACHE_ENTRY_MODIFIED_EVENT_RESPONSE: u8 = 0x61;
pub const CACHE_ENTRY_REMOVED_EVENT_RESPONSE: u8 = 0x62;
pub const CACHE_ENTRY_EXPIRED_EVENT_RESPONSE: u8 = 0x63;

/// Pushed counter event
pub const COUNTER_EVENT_RESPONSE: u8 = 0x66;

/// Request operations and their op code pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    Put = 0x01,
    Get = 0x03,
    PutIfAbsent = 0x05,
    Replace = 0x07,
    ReplaceIfUnmodified = 0x09,
    Remove = 0x0B,
    RemoveIfUnmodified = 0x0D,
    ContainsKey = 0x0F,
    GetWithVersion = 0x11,
    Clear = 0x13,
    Stats = 0x15,
    Ping = 0x17,
    BulkGet = 0x19,
    GetWithMetadata = 0x1B,
    BulkGetKeys = 0x1D,
    Query = 0x1F,
    AuthMechList = 0x21,
    Auth = 0x23,
    AddClientListener = 0x25,
    RemoveClientListener = 0x27,
    Size = 0x29,
    Exec = 0x2B,
    PutAll = 0x2D,
    GetAll = 0x2F,
    IterationStart = 0x31,
    IterationNext = 0x33,
    IterationEnd = 0x35,
    GetStream = 0x37,
    PutStream = 0x39,
    Prepare = 0x3B,
    Commit = 0x3D,
    Rollback = 0x3F,
}

impl Operation {
    /// Op code written in the request header
    pub fn request_code(self) -> u8 {
        self as u8
    }

    /// Op code the server answers with on success
    pub fn response_code(self) -> u8 {
        self as u8 + 1
    }

    /// Look up an operation by its request op code
    pub fn from_request_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Operation::Put),
            0x03 => Some(Operation::Get),
            0x05 => Some(Operation::PutIfAbsent),
            0x07 => Some(Operation::Replace),
            0x09 => Some(Operation::ReplaceIfUnmodified),
            0x0B => Some(Operation::Remove),
            0x0D => Some(Operation::RemoveIfUnmodified),
            0x0F => Some(Operation::ContainsKey),
            0x11 => Some(Operation::GetWithVersion),
            0x13 => Some(Operation::Clear),
            0x15 => Some(Operation::Stats),
            0x17 => Some(Operation::Ping),
            0x19 => Some(Operation::BulkGet),
            0x1B => Some(Operation::GetWithMetadata),
            0x1D => Some(Operation::BulkGetKeys),
            0x1F => Some(Operation::Query),
            0x21 => Some(Operation::AuthMechList),
            0x23 => Some(Operation::Auth),
            0x25 => Some(Operation::AddClientListener),
            0x27 => Some(Operation::RemoveClientListener),
            0x29 => Some(Operation::Size),
            0x2B => Some(Operation::Exec),
            0x2D => Some(Operation::PutAll),
            0x2F => Some(Operation::GetAll),
            0x31 => Some(Operation::IterationStart),
            0x33 => Some(Operation::IterationNext),
            0x35 => Some(Operation::IterationEnd),
            0x37 => Some(Operation::GetStream),
            0x39 => Some(Operation::PutStream),
            0x3B => Some(Operation::Prepare),
            0x3D => Some(Operation::Commit),
            0x3F => Some(Operation::Rollback),
            _ => None,
        }
    }

    /// Look up an operation by the response op code it expects
    pub fn from_response_code(code: u8) -> Option<Self> {
        if code % 2 != 0 {
            return None;
        }
        code.checked_sub(1).and_then(Self::from_request_code)
    }
}

/// Human readable name of any request, response or event op code
pub fn name_of(code: u8) -> &'static str {
    match code {
        ERROR_RESPONSE => "ERROR_RESPONSE",
        CACHE_ENTRY_CREATED_EVENT_RESPONSE => "CACHE_ENTRY_CREATED_EVENT",
        CACHE_ENTRY_MODIFIED_EVENT_RESPONSE => "CACHE_ENTRY_MODIFIED_EVENT",
        CACHE_ENTRY_REMOVED_EVENT_RESPONSE => "CACHE_ENTRY_REMOVED_EVENT",
        CACHE_ENTRY_EXPIRED_EVENT_RESPONSE => "CACHE_ENTRY_EXPIRED_EVENT",
        COUNTER_EVENT_RESPONSE => "COUNTER_EVENT",
        _ => match Operation::from_request_code(code).or_else(|| Operation::from_response_code(code)) {
            Some(op) => op.name(),
            None => "UNKNOWN",
        },
    }
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Put => "PUT",
            Operation::Get => "GET",
            Operation::PutIfAbsent => "PUT_IF_ABSENT",
            Operation::Replace => "REPLACE",
            Operation::ReplaceIfUnmodified => "REPLACE_IF_UNMODIFIED",
            Operation::Remove => "REMOVE",
            Operation::RemoveIfUnmodified => "REMOVE_IF_UNMODIFIED",
            Operation::ContainsKey => "CONTAINS_KEY",
            Operation::GetWithVersion => "GET_WITH_VERSION",
            Operation::Clear => "CLEAR",
            Operation::Stats => "STATS",
            Operation::Ping => "PING",
            Operation::BulkGet => "BULK_GET",
            Operation::GetWithMetadata => "GET_WITH_METADATA",
            Operation::BulkGetKeys => "BULK_GET_KEYS",
            Operation::Query => "QUERY",
            Operation::AuthMechList => "AUTH_MECH_LIST",
            Operation::Auth => "AUTH",
            Operation::AddClientListener => "ADD_CLIENT_LISTENER",
            Operation::RemoveClientListener => "REMOVE_CLIENT_LISTENER",
            Operation::Size => "SIZE",
            Operation::Exec => "EXEC",
            Operation::PutAll => "PUT_ALL",
            Operation::GetAll => "GET_ALL",
            Operation::IterationStart => "ITERATION_START",
            Operation::IterationNext => "ITERATION_NEXT",
            Operation::IterationEnd => "ITERATION_END",
            Operation::GetStream => "GET_STREAM",
            Operation::PutStream => "PUT_STREAM",
            Operation::Prepare => "PREPARE",
            Operation::Commit => "COMMIT",
            Operation::Rollback => "ROLLBACK",
        }
    }
}

/// True for the entry event codes that share the response stream
pub fn is_entry_event(code: u8) -> bool {
    matches!(
        code,
        CACHE_ENTRY_CREATED_EVENT_RESPONSE
            | CACHE_ENTRY_MODIFIED_EVENT_RESPONSE
            | CACHE_ENTRY_REMOVED_EVENT_RESPONSE
    )
}
