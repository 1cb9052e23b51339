//! Periodic monitor host — one thread, two cooperative tick loops.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! multi-task scheduling and `async-io-mini` for reactor-driven timers
//! (no busy-spinning). Two concurrent futures:
//!
//! 1. **Button** — polls the status byte on the fast cadence (~20 ms)
//! 2. **Status** — battery sample then shutdown check, co-scheduled on the
//!    slow cadence (~1 s)
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────┐
//!  │  Monitor Thread                                        │
//!  │  ┌──────────────────────────────────────────────────┐  │
//!  │  │  futures_lite::block_on (drives reactor+futures) │  │
//!  │  │  ┌────────────────────────────────────────────┐  │  │
//!  │  │  │  edge_executor::LocalExecutor              │  │  │
//!  │  │  │  ┌─────────────┐   ┌────────────────────┐  │  │  │
//!  │  │  │  │ Button 20ms │   │ Battery+Shutdown 1s│  │  │  │
//!  │  │  │  └─────────────┘   └────────────────────┘  │  │  │
//!  │  │  └────────────────────────────────────────────┘  │  │
//!  │  └──────────────────────────────────────────────────┘  │
//!  └────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick brackets the device lock around its register reads only; the
//! loops never sleep while holding it. Cancellation is synchronous: the
//! stop flag parks both loops and the join returns only after any
//! in-flight tick has completed.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::rc::Rc;
use std::sync::Arc;
use std::thread::JoinHandle;

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::battery::BatteryMonitor;
use crate::button::ButtonPoller;
use crate::config::HatConfig;
use crate::device::Hat;
use crate::ports::{EventSink, PowerOff};
use crate::shutdown::ShutdownSupervisor;

/// Handle to the running monitor thread. Stop it before tearing the
/// device down; dropping the handle stops it implicitly.
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Cancel both monitor loops and block until the in-flight tick (if
    /// any) has completed and the thread has exited.
    pub fn stop(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("monitor thread panicked during shutdown");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Sleep `total` in short reactor-timer slices so a stop request does not
/// have to wait out a whole status interval.
async fn tick_delay(total: Duration, stop: &AtomicBool) {
    const SLICE: Duration = Duration::from_millis(20);
    let mut remaining = total;
    while !stop.load(Ordering::Acquire) && remaining > Duration::ZERO {
        let step = remaining.min(SLICE);
        async_io_mini::Timer::after(step).await;
        remaining -= step;
    }
}

/// Fast loop: button edge detection.
async fn button_loop<I2C, S>(
    poller: ButtonPoller<I2C>,
    interval: Duration,
    sink: Rc<RefCell<S>>,
    stop: Arc<AtomicBool>,
) where
    I2C: I2c,
    S: EventSink,
{
    loop {
        if stop.load(Ordering::Acquire) {
            return;
        }
        poller.tick(&mut *sink.borrow_mut());
        tick_delay(interval, &stop).await;
    }
}

/// Slow loop: battery sample, then shutdown check, same tick.
async fn status_loop<I2C, S, P>(
    battery: BatteryMonitor<I2C>,
    mut supervisor: ShutdownSupervisor<I2C>,
    interval: Duration,
    sink: Rc<RefCell<S>>,
    mut power: P,
    stop: Arc<AtomicBool>,
) where
    I2C: I2c,
    S: EventSink,
    P: PowerOff,
{
    loop {
        if stop.load(Ordering::Acquire) {
            return;
        }
        battery.tick(&mut *sink.borrow_mut());
        supervisor.tick(&mut *sink.borrow_mut(), &mut power);
        tick_delay(interval, &stop).await;
    }
}

fn run_monitor<I2C, S, P>(
    hat: Hat<I2C>,
    button_interval: Duration,
    status_interval: Duration,
    sink: S,
    power: P,
    stop: Arc<AtomicBool>,
) where
    I2C: I2c,
    S: EventSink,
    P: PowerOff,
{
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let sink = Rc::new(RefCell::new(sink));

    let fast = executor.spawn(button_loop(
        ButtonPoller::new(hat.clone()),
        button_interval,
        Rc::clone(&sink),
        Arc::clone(&stop),
    ));
    let slow = executor.spawn(status_loop(
        BatteryMonitor::new(hat.clone()),
        ShutdownSupervisor::new(hat),
        status_interval,
        sink,
        power,
        stop,
    ));

    futures_lite::future::block_on(executor.run(async {
        fast.await;
        slow.await;
    }));
}

/// Start the periodic monitors on their own thread. Both loops run their
/// first tick immediately, then settle into their configured cadence.
pub fn spawn<I2C, S, P>(hat: Hat<I2C>, config: &HatConfig, sink: S, power: P) -> MonitorHandle
where
    I2C: I2c + Send + 'static,
    S: EventSink + Send + 'static,
    P: PowerOff + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let button_interval = Duration::from_millis(u64::from(config.button_poll_interval_ms));
    let status_interval = Duration::from_millis(u64::from(config.status_interval_ms));

    let thread_stop = Arc::clone(&stop);
    let thread = std::thread::Builder::new()
        .name("hat-monitor".into())
        .spawn(move || run_monitor(hat, button_interval, status_interval, sink, power, thread_stop))
        .expect("monitor thread creation failed");

    info!(
        "monitor started (button {} ms, status {} ms)",
        config.button_poll_interval_ms, config.status_interval_ms
    );

    MonitorHandle {
        stop,
        thread: Some(thread),
    }
}
