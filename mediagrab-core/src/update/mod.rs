//! Application update lifecycle.
//!
//! - `state`: Update states and the broadcast payload
//! - `channel`: Transport trait, transport events and the no-op transport
//! - `lifecycle`: State machine driving a transport

mod channel;
mod lifecycle;
mod state;

pub use channel::{
    update_event_channel, NoopUpdateChannel, UpdateChannel, UpdateChannelError,
    UpdateChannelEvent, UpdateEventReceiver, UpdateEventSender,
};
pub use lifecycle::{
    UpdateError, UpdateLifecycle, CHECKING_MESSAGE, DEV_MODE_MESSAGE, DOWNLOADED_MESSAGE,
    NOT_AVAILABLE_MESSAGE, UPDATE_FAILED_MESSAGE,
};
pub use state::{UpdateState, UpdateStatusPayload};
