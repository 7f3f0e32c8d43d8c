//! Wireless token and gesture reduction
//!
//! Each token yields at most one of: a clear request, a mode request, or a
//! payload change. Oversized payloads become a status request instead and
//! leave the store untouched.

use pixeltag_protocol::command::unescape_newlines;
use pixeltag_protocol::{Command, MirrorField};

use super::gesture::ButtonGesture;
use super::queue::{ContentChange, PendingRequest, RequestQueue};
use crate::config::{ButtonAction, ButtonActions, MAX_INFO_LEN};
use crate::content::{ContentStore, DisplayMode};
use crate::render::StatusMessage;

/// What a written token did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    ClearRequested,
    ModeRequested(DisplayMode),
    /// Payload stored; the mode it belongs to was requested
    PayloadChanged(DisplayMode),
    /// Payload equal to the stored one
    Unchanged,
    /// Payload over its limit
    Rejected,
    /// Mirror read; answered by the caller
    Query(MirrorField),
    /// Unrecognized token
    Ignored,
}

fn request_mode(store: &mut ContentStore, queue: &mut RequestQueue, mode: DisplayMode) {
    store.set_mode(mode);
    queue.push(PendingRequest::Content(ContentChange {
        mode,
        redraw: false,
    }));
}

fn reject(queue: &mut RequestQueue) -> WriteOutcome {
    queue.push(PendingRequest::Status(StatusMessage::DataTooLong));
    WriteOutcome::Rejected
}

fn payload_changed(
    store: &mut ContentStore,
    queue: &mut RequestQueue,
    mode: DisplayMode,
) -> WriteOutcome {
    queue.cancel_clear();
    request_mode(store, queue, mode);
    WriteOutcome::PayloadChanged(mode)
}

/// Apply a parsed token
pub fn reduce_command(
    command: Option<Command<'_>>,
    store: &mut ContentStore,
    queue: &mut RequestQueue,
) -> WriteOutcome {
    let outcome = match command {
        Some(Command::Clear) => {
            store.clear_all();
            queue.push(PendingRequest::Clear);
            WriteOutcome::ClearRequested
        }
        Some(Command::ShowInfo) => {
            request_mode(store, queue, DisplayMode::Info);
            WriteOutcome::ModeRequested(DisplayMode::Info)
        }
        Some(Command::ShowQr) => {
            request_mode(store, queue, DisplayMode::Qr);
            WriteOutcome::ModeRequested(DisplayMode::Qr)
        }
        Some(Command::InfoData(raw)) => match unescape_newlines::<MAX_INFO_LEN>(raw) {
            Ok(text) => match store.set_info(&text) {
                Ok(true) => payload_changed(store, queue, DisplayMode::Info),
                Ok(false) => WriteOutcome::Unchanged,
                Err(_) => reject(queue),
            },
            Err(_) => reject(queue),
        },
        Some(Command::QrData(text)) => match store.set_qr(text) {
            Ok(true) => payload_changed(store, queue, DisplayMode::Qr),
            Ok(false) => WriteOutcome::Unchanged,
            Err(_) => reject(queue),
        },
        Some(Command::Query(field)) => WriteOutcome::Query(field),
        None => WriteOutcome::Ignored,
    };

    match outcome {
        WriteOutcome::Ignored => debug!("Ignored unrecognized token"),
        WriteOutcome::Rejected => warn!("Payload rejected: too long"),
        other => info!("Token accepted: {}", other),
    }
    outcome
}

/// Reject a data write the link could not even buffer
pub fn reduce_oversized(queue: &mut RequestQueue) -> WriteOutcome {
    warn!("Payload rejected: exceeded the link buffer");
    reject(queue)
}

/// Apply a gesture through the action table
///
/// Mode cycling is queued here. Halting actions are returned for the
/// controller to carry out.
pub fn reduce_gesture(
    gesture: ButtonGesture,
    actions: &ButtonActions,
    store: &mut ContentStore,
    queue: &mut RequestQueue,
) -> Option<ButtonAction> {
    let action = match gesture {
        ButtonGesture::None => return None,
        ButtonGesture::SingleClick => actions.single,
        ButtonGesture::DoubleClick => actions.double,
    };

    match action {
        ButtonAction::None => None,
        ButtonAction::CycleMode => {
            let next = store.current_mode().cycle_next(!store.qr().is_empty());
            request_mode(store, queue, next);
            Some(action)
        }
        ButtonAction::Halt | ButtonAction::BlankAndHalt => Some(action),
    }
}
