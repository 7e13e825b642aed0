//! Classify HTTP status, curl errors and protocol issues into retry kinds.

use crate::error::{FetchError, ProtocolIssue};
use crate::retry::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a fetch error into an ErrorKind.
///
/// A truncated body counts as a connection failure (the server closed early);
/// every other protocol issue is permanent.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Transport { cause, .. } => classify_curl_error(cause),
        FetchError::Remote { status, .. } => classify_http_status(*status),
        FetchError::Protocol {
            issue: ProtocolIssue::Truncated { .. },
            ..
        } => ErrorKind::Connection,
        FetchError::Protocol { .. }
        | FetchError::InvalidArgument(_)
        | FetchError::Timeout { .. }
        | FetchError::WorkerLost => ErrorKind::Other,
    }
}
