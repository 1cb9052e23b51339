//! Port traits — the boundary between the control core and the host.
//!
//! ```text
//!   monitors ──▶ EventSink  ──▶ host framework adapter
//!   shutdown ──▶ PowerOff   ──▶ host power-off primitive
//! ```
//!
//! Host adapters (sysfs bridges, power-supply integration, input-event
//! wiring) implement these traits; the core never touches a host framework
//! directly. Sinks are called *outside* the device lock.

use crate::device::BatterySnapshot;
use crate::shutdown::ShutdownRequest;

/// Events published by the periodic monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatEvent {
    /// Button edge: released → pressed.
    ButtonPressed,
    /// Button edge: pressed → released.
    ButtonReleased,
    /// A battery tick completed and the snapshot was republished.
    BatteryChanged(BatterySnapshot),
    /// The firmware asserted a shutdown request (power-off follows via
    /// [`PowerOff`]; this event is informational).
    ShutdownRequested(ShutdownRequest),
}

/// The monitors emit structured events through this port. Adapters decide
/// where they go (input subsystem, power-supply properties, a log, ...).
pub trait EventSink {
    fn emit(&mut self, event: &HatEvent);
}

/// Host-provided "power off now" primitive — the only side effect that
/// crosses the system boundary.
pub trait PowerOff {
    fn power_off(&mut self, reason: ShutdownRequest);
}

/// Sink that discards every event, for hosts that only use the passive
/// accessors.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &HatEvent) {}
}
