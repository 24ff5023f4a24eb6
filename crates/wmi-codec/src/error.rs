use thiserror::Error;

use crate::negotiation::{NegotiationState, WmiVersion};
use crate::ops::OpId;
use crate::pdev::Direction;

pub type Result<T> = std::result::Result<T, WmiError>;

/// Unified error type for the WMI codec.
///
/// Everything here is a local, synchronous return value; the codec has no
/// asynchronous error channel. A [`WmiError::MalformedEvent`] means the whole
/// event was discarded with nothing extracted, and a
/// [`WmiError::VersionIncompatible`] means device bring-up must fail.
#[derive(Debug, Error)]
pub enum WmiError {
    /// The transport could not allocate a command buffer. Callers must not
    /// retry synchronously; the allocation pool is refilled by completions.
    #[error("transport failed to allocate a {len} byte command buffer")]
    AllocationFailed { len: usize },

    /// A device index outside the translation table for the active chip
    /// variant. The operation is aborted before anything reaches the wire.
    #[error("no {dir} translation for device index {id:#x}")]
    InvalidDeviceIndex { dir: Direction, id: u32 },

    /// Untrusted event bytes failed validation. The event is dropped.
    #[error("malformed event: {reason} (offset {offset})")]
    MalformedEvent { reason: &'static str, offset: usize },

    /// The active backend has no implementation for this operation.
    #[error("operation {op:?} is not supported by the active backend")]
    NotSupported { op: OpId },

    /// An event id this codec does not know. The event is dropped.
    #[error("unrecognized event id {event_id:#x}")]
    UnknownEventId { event_id: u32 },

    /// Called before negotiation reached `Ready`.
    #[error("codec is not ready (negotiation state: {state:?})")]
    NotReady { state: NegotiationState },

    /// Fatal negotiation failure; not retried.
    #[error("firmware ABI {firmware} is incompatible with host {host}")]
    VersionIncompatible {
        host: WmiVersion,
        firmware: WmiVersion,
    },

    /// The transport accepted the allocation but rejected the send. The
    /// builder has already freed the buffer.
    #[error("transport rejected command send: {0}")]
    TransportReject(&'static str),
}
