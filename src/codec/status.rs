//! Status classification
//!
//! Turns error statuses into typed errors. The error message is read from the
//! stream here, so nothing is left behind for the next read.

use bytes::Buf;

use super::HeaderParams;
use crate::error::{HotRodError, Result};
use crate::primitive::read_string;
use crate::protocol::status::{self, classify, StatusOutcome, COMMAND_TIMEOUT_STATUS};
use crate::topology::TopologyAddress;

/// Raise the error encoded by `status`, or return `Ok` for non-error statuses.
///
/// `params` is `None` for pushed events, which answer no request.
pub fn check_for_errors_in_response_status<B: Buf + ?Sized>(
    buf: &mut B,
    params: Option<&HeaderParams>,
    status: u8,
    server: &TopologyAddress,
) -> Result<()> {
    let cache = params.map(HeaderParams::cache_name_lossy).unwrap_or_default();
    let message_id = params.map_or(0, HeaderParams::message_id);

    tracing::trace!("[{}] Received operation status: {:#x}", cache, status);

    match classify(status) {
        StatusOutcome::Success | StatusOutcome::SuccessWithPrevious => Ok(()),
        StatusOutcome::ServerError => {
            let message = read_string(buf)?;
            if status == COMMAND_TIMEOUT_STATUS {
                tracing::trace!("Server-side timeout performing operation: {}", message);
            } else {
                tracing::error!(status = status, server = %server, "Error received from the server: {}", message);
            }
            if status::desynchronizes_stream(status) {
                tracing::debug!("[{}] Status {:#x} invalidates the connection to {}", cache, status, server);
            }
            Err(HotRodError::ServerError {
                message,
                status,
                message_id,
            })
        }
        StatusOutcome::IllegalLifecycle => {
            let message = read_string(buf)?;
            Err(HotRodError::IllegalLifecycleState {
                message,
                message_id,
                server: server.clone(),
            })
        }
        StatusOutcome::NodeSuspected => {
            let message = read_string(buf)?;
            tracing::trace!(
                "[{}] A remote node was suspected while executing messageId={}. Check if retry possible. Message from server: {}",
                cache,
                message_id,
                message
            );
            Err(HotRodError::NodeSuspected { message, message_id })
        }
        StatusOutcome::Unknown => Err(HotRodError::UnknownStatus { status }),
    }
}
