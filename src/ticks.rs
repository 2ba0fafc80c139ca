//! Tick scheduler shared state.
//!
//! The periodic tick source (an interrupt or a high-priority task) and the
//! control loop share a handful of counters and flags. They live in a single
//! [`TickState`] guarded by one critical-section mutex and are only reached
//! through the operations below, each of which runs entirely inside the
//! critical section.
//!
//! # Handshake
//!
//! The producer calls [`TickState::on_tick`] on every hardware tick. It
//! counts the sleep counter up and, at a fixed sub-rate, posts a
//! [`WakeReason`]. The consumer takes-and-clears that reason; when nothing is
//! pending it parks on a [`Signal`] until the producer posts again.

use core::cell::Cell;

use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    signal::Signal,
};

use crate::config::Schedule;

/// Why the control loop was woken.
///
/// Ordered by priority: when several reasons arrive before the consumer
/// runs, the highest one is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeReason {
    /// Periodic control-loop tick
    Tick,
    /// Button edge while dormant
    Button,
    /// A full day period has elapsed
    Resume,
}

#[derive(Clone, Copy)]
struct Shared {
    sleep_counter: i32,
    pending: Option<WakeReason>,
    waiting: bool,
    running: bool,
}

impl Shared {
    const fn new() -> Self {
        Self {
            sleep_counter: 0,
            pending: None,
            waiting: false,
            running: true,
        }
    }

    fn post(&mut self, reason: WakeReason) {
        self.pending = Some(match self.pending {
            Some(current) => current.max(reason),
            None => reason,
        });
    }
}

/// State shared between the tick source and the control loop.
pub struct TickState {
    schedule: Schedule,
    shared: Mutex<CriticalSectionRawMutex, Cell<Shared>>,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl TickState {
    pub const fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            shared: Mutex::new(Cell::new(Shared::new())),
            wake: Signal::new(),
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    fn with<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        self.shared.lock(|cell| {
            let mut shared = cell.get();
            let result = f(&mut shared);
            cell.set(shared);
            result
        })
    }

    /// Producer side: one hardware tick.
    ///
    /// Past one day period a [`WakeReason::Resume`] is posted on every tick.
    /// Otherwise a [`WakeReason::Tick`] is posted every `wake_divider` ticks,
    /// unless the control loop is dormant.
    pub fn on_tick(&self) {
        let schedule = self.schedule;
        let posted = self.with(|shared| {
            if !shared.running {
                return false;
            }
            shared.sleep_counter = shared.sleep_counter.wrapping_add(1);
            if shared.sleep_counter > schedule.day_period {
                shared.post(WakeReason::Resume);
                true
            } else if !shared.waiting
                && shared
                    .sleep_counter
                    .rem_euclid(i32::from(schedule.wake_divider))
                    == 0
            {
                shared.post(WakeReason::Tick);
                true
            } else {
                false
            }
        });
        if posted {
            self.wake.signal(());
        }
    }

    /// Takes and clears the pending wake reason.
    pub fn take_wake(&self) -> Option<WakeReason> {
        self.with(|shared| shared.pending.take())
    }

    /// Blocks until a wake reason is pending, then takes it.
    pub async fn wait_for_wake(&self) -> WakeReason {
        loop {
            if let Some(reason) = self.take_wake() {
                return reason;
            }
            self.wake.wait().await;
        }
    }

    /// Ticks since the last interaction, relative to the current day.
    pub fn sleep_counter(&self) -> i32 {
        self.with(|shared| shared.sleep_counter)
    }

    /// Restarts the day at boot, once the power-up press is released.
    pub fn reset(&self) {
        self.with(|shared| {
            shared.sleep_counter = 0;
            shared.waiting = false;
            shared.running = true;
        });
    }

    /// Stops periodic wakes while the string is dormant.
    pub fn begin_waiting(&self) {
        self.with(|shared| shared.waiting = true);
    }

    /// Leaves dormancy: rewinds the counter by exactly one day period.
    ///
    /// Any wake still pending from the dormant phase is dropped.
    pub fn finish_waiting(&self) {
        let day_period = self.schedule.day_period;
        self.with(|shared| {
            shared.sleep_counter = shared.sleep_counter.wrapping_sub(day_period);
            shared.waiting = false;
            shared.pending = None;
        });
    }

    pub fn is_waiting(&self) -> bool {
        self.with(|shared| shared.waiting)
    }

    /// Turns the tick source off; further ticks are ignored.
    pub fn suspend(&self) {
        self.with(|shared| {
            shared.running = false;
            shared.pending = None;
        });
    }
}
