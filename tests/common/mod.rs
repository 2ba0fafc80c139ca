//! Shared mocks for the control-loop scenarios

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::v2::InputPin;
use fairy_lights::{Button, Light, PowerControl, Schedule, SleepDepth, TickState};

/// Control-loop wakes every 16 ticks; lit for 100 wakes, day of 200 wakes.
pub const SCHEDULE: Schedule = Schedule::from_ticks(1600, 3200, 16);

// ============================================================================
// Event log
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Duty(u8),
    Enable,
    Disable,
    Sleep(SleepDepth),
    Restart,
}

#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn duties(&self) -> Vec<u8> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Duty(duty) => Some(*duty),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// Mock light
// ============================================================================

pub struct MockLight {
    log: Log,
}

impl MockLight {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl Light for MockLight {
    fn set_duty(&mut self, duty: u8) {
        self.log.push(Event::Duty(duty));
    }

    fn enable(&mut self) {
        self.log.push(Event::Enable);
    }

    fn disable(&mut self) {
        self.log.push(Event::Disable);
    }
}

// ============================================================================
// Mock power control
// ============================================================================

pub struct MockPower {
    log: Log,
}

impl MockPower {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl PowerControl for MockPower {
    fn set_sleep_depth(&mut self, depth: SleepDepth) {
        self.log.push(Event::Sleep(depth));
    }

    fn restart(&mut self) -> ! {
        self.log.push(Event::Restart);
        panic!("restart requested");
    }
}

// ============================================================================
// Mock button
// ============================================================================

/// What happens while the loop is dormant and waiting for a press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DormantWake {
    /// The button is pressed straight away
    Press,
    /// Nobody touches the button; time runs until the day has passed
    DayElapses,
}

/// Scripted button. Every sample also advances the tick source by one
/// control period, standing in for the time between two control ticks.
pub struct MockButton<'a> {
    ticks: &'a TickState,
    ticks_per_sample: u16,
    levels: RefCell<VecDeque<bool>>,
    dormant: RefCell<DormantWake>,
}

impl<'a> MockButton<'a> {
    pub fn new(ticks: &'a TickState) -> Self {
        Self {
            ticks,
            ticks_per_sample: ticks.schedule().wake_divider,
            levels: RefCell::new(VecDeque::new()),
            dormant: RefCell::new(DormantWake::Press),
        }
    }

    /// Queues raw levels (true = released). Idle once the queue is empty.
    pub fn push(&self, levels: &[bool]) {
        self.levels.borrow_mut().extend(levels.iter().copied());
    }

    /// Queues one clean press followed by a clean release.
    pub fn press(&self) {
        self.push(&[false; 3]);
        self.push(&[true; 6]);
    }

    pub fn set_dormant(&self, dormant: DormantWake) {
        *self.dormant.borrow_mut() = dormant;
    }

    pub fn pending(&self) -> usize {
        self.levels.borrow().len()
    }
}

impl InputPin for MockButton<'_> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        for _ in 0..self.ticks_per_sample {
            self.ticks.on_tick();
        }
        Ok(self.levels.borrow_mut().pop_front().unwrap_or(true))
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl Button for MockButton<'_> {
    async fn wait_for_press(&mut self) {
        let dormant = *self.dormant.borrow();
        match dormant {
            DormantWake::Press => {}
            DormantWake::DayElapses => {
                let day_period = self.ticks.schedule().day_period;
                while self.ticks.sleep_counter() <= day_period {
                    self.ticks.on_tick();
                }
                core::future::pending::<()>().await;
            }
        }
    }
}
