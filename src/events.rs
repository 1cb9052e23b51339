//! Monitor-to-host event bridge.
//!
//! Hosts that prefer polling a queue over implementing a sink can hand the
//! monitors a [`ChannelSink`]: it forwards every event into a bounded
//! static channel that the host loop drains. Producer side never blocks —
//! when the host falls behind, the newest event is dropped with a warning
//! rather than stalling a monitor tick.
//!
//! ```text
//! ┌──────────────┐   HatEvent   ┌──────────────┐
//! │ monitor task │─────────────▶│  host loop   │
//! │ (ChannelSink)│              │ (try_recv)   │
//! └──────────────┘              └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::ports::{EventSink, HatEvent};

/// Maximum number of undelivered events.
const EVENT_DEPTH: usize = 16;

static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, HatEvent, EVENT_DEPTH> = Channel::new();

/// [`EventSink`] that forwards into the static event channel.
pub struct ChannelSink;

impl EventSink for ChannelSink {
    fn emit(&mut self, event: &HatEvent) {
        if EVENT_CHANNEL.try_send(*event).is_err() {
            warn!("event channel full, dropping {event:?}");
        }
    }
}

/// Non-blocking receive of the next pending event.
pub fn try_recv() -> Option<HatEvent> {
    EVENT_CHANNEL.try_receive().ok()
}

/// Await the next event (for async host loops).
pub async fn recv() -> HatEvent {
    EVENT_CHANNEL.receive().await
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain(mut handler: impl FnMut(HatEvent)) {
    while let Some(event) = try_recv() {
        handler(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the static channel end to end; splitting these cases
    // across #[test] fns would race on the shared queue.
    #[test]
    fn channel_sink_delivers_in_order_and_drops_on_overflow() {
        drain(|_| {});

        let mut sink = ChannelSink;
        sink.emit(&HatEvent::ButtonPressed);
        sink.emit(&HatEvent::ButtonReleased);
        assert_eq!(try_recv(), Some(HatEvent::ButtonPressed));
        assert_eq!(try_recv(), Some(HatEvent::ButtonReleased));
        assert_eq!(try_recv(), None);

        // Overflow: depth events fit, the extra one is dropped.
        for _ in 0..EVENT_DEPTH + 3 {
            sink.emit(&HatEvent::ButtonPressed);
        }
        let mut seen = 0;
        drain(|_| seen += 1);
        assert_eq!(seen, EVENT_DEPTH);
    }
}
