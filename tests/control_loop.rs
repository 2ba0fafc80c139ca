//! End-to-end scenarios for the control loop

mod common;
use common::*;

use std::panic::{AssertUnwindSafe, catch_unwind};

use embassy_futures::block_on;
use fairy_lights::{
    Button, Config, Controller, Light, Mode, ModeCycle, PowerControl, Runtime, SleepDepth,
    TickState, breath_intensity,
};

fn run_steps<L: Light, B: Button, P: PowerControl>(runtime: &mut Runtime<'_, L, B, P>, n: usize) {
    for _ in 0..n {
        block_on(runtime.step());
    }
}

/// Control ticks taken by one scripted press and release.
const PRESS_STEPS: usize = 9;

/// Control tick on which the idle timeout fires.
const TIMEOUT_STEP: usize = (SCHEDULE.on_duration / SCHEDULE.wake_divider as i32) as usize;

#[test]
fn boot_breathe_sleep_and_wake_on_button() {
    let ticks = TickState::new(SCHEDULE);
    let log = Log::default();
    let button = MockButton::new(&ticks);
    // Power-up press still held
    button.push(&[false; 4]);
    let mut runtime = Runtime::new(
        Controller::new(Config::new(SCHEDULE)),
        MockLight::new(&log),
        button,
        MockPower::new(&log),
        &ticks,
    );

    block_on(runtime.start());
    assert_eq!(runtime.button().pending(), 0);
    assert_eq!(ticks.sleep_counter(), 0);
    assert_eq!(runtime.controller().mode(), Mode::Breathe);

    log.clear();
    run_steps(&mut runtime, 50);
    let expected: Vec<u8> = (0..50u16)
        .map(|t| breath_intensity(((3 * t + 4) >> 3) as u8))
        .collect();
    assert_eq!(log.duties(), expected);

    run_steps(&mut runtime, TIMEOUT_STEP - 51);
    assert_eq!(runtime.controller().mode(), Mode::Breathe);

    // The timeout step goes dormant; the button brings it straight back
    log.clear();
    run_steps(&mut runtime, 1);
    assert_eq!(
        log.events(),
        vec![
            Event::Duty(0x01),
            Event::Disable,
            Event::Sleep(SleepDepth::Idle),
            Event::Enable,
        ]
    );
    assert_eq!(runtime.controller().mode(), Mode::Breathe);
    assert_eq!(ticks.sleep_counter(), SCHEDULE.on_duration - SCHEDULE.day_period);

    // The finger still on the button is not a second press
    runtime.button().push(&[false; 5]);
    run_steps(&mut runtime, 10);
    assert_eq!(runtime.controller().mode(), Mode::Breathe);
}

#[test]
fn timeout_remembers_mode_until_next_day() {
    let ticks = TickState::new(SCHEDULE);
    let log = Log::default();
    let mut runtime = Runtime::new(
        Controller::new(Config::new(SCHEDULE)),
        MockLight::new(&log),
        MockButton::new(&ticks),
        MockPower::new(&log),
        &ticks,
    );
    block_on(runtime.start());

    for _ in 0..3 {
        runtime.button().press();
    }
    run_steps(&mut runtime, 3 * PRESS_STEPS);
    assert_eq!(runtime.controller().mode(), Mode::Flash);

    run_steps(&mut runtime, TIMEOUT_STEP - 3 * PRESS_STEPS - 1);
    runtime.button().set_dormant(DormantWake::DayElapses);
    run_steps(&mut runtime, 1);

    assert_eq!(runtime.controller().mode(), Mode::Flash);
    assert_eq!(runtime.controller().resume_mode(), Mode::Flash);
    assert_eq!(ticks.sleep_counter(), 1);
    assert!(!ticks.is_waiting());

    // Lit again for a full on-duration
    run_steps(&mut runtime, TIMEOUT_STEP - 1);
    assert_eq!(runtime.controller().mode(), Mode::Flash);
}

#[test]
fn freeze_holds_duty_across_ticks_and_dormancy() {
    let ticks = TickState::new(SCHEDULE);
    let log = Log::default();
    let mut runtime = Runtime::new(
        Controller::new(Config::new(SCHEDULE)),
        MockLight::new(&log),
        MockButton::new(&ticks),
        MockPower::new(&log),
        &ticks,
    );
    block_on(runtime.start());

    run_steps(&mut runtime, 37);
    runtime.button().press();
    run_steps(&mut runtime, PRESS_STEPS);
    assert_eq!(runtime.controller().mode(), Mode::Freeze);
    let held = runtime.controller().intensity();

    log.clear();
    run_steps(&mut runtime, TIMEOUT_STEP - 37 - PRESS_STEPS - 1);
    assert!(log.duties().iter().all(|&duty| duty == held));

    // Through Wait and back
    run_steps(&mut runtime, 1);
    assert_eq!(runtime.controller().mode(), Mode::Freeze);
    log.clear();
    run_steps(&mut runtime, 20);
    assert_eq!(log.duties(), vec![held; 20]);
}

#[test]
fn presses_cycle_through_active_modes() {
    let ticks = TickState::new(SCHEDULE);
    let log = Log::default();
    let config = Config::new(SCHEDULE).with_modes(ModeCycle::DUTY_CYCLED);
    let mut runtime = Runtime::new(
        Controller::new(config),
        MockLight::new(&log),
        MockButton::new(&ticks),
        MockPower::new(&log),
        &ticks,
    );
    block_on(runtime.start());

    let order = [Mode::Breathe, Mode::Freeze, Mode::Flicker, Mode::Flash];
    for presses in 1..=8 {
        runtime.button().press();
        run_steps(&mut runtime, PRESS_STEPS);
        assert_eq!(
            runtime.controller().mode(),
            order[presses % order.len()],
            "{presses} presses"
        );
    }
    assert_eq!(runtime.controller().mode(), Mode::Breathe);
}

#[test]
fn off_waits_for_release_then_restarts() {
    let ticks = TickState::new(SCHEDULE);
    let log = Log::default();
    let mut runtime = Runtime::new(
        Controller::new(Config::new(SCHEDULE)),
        MockLight::new(&log),
        MockButton::new(&ticks),
        MockPower::new(&log),
        &ticks,
    );
    block_on(runtime.start());

    for _ in 0..3 {
        runtime.button().press();
    }
    run_steps(&mut runtime, 3 * PRESS_STEPS);
    assert_eq!(runtime.controller().mode(), Mode::Flash);

    runtime.button().push(&[false; 3]);
    run_steps(&mut runtime, 2);
    let result = catch_unwind(AssertUnwindSafe(|| block_on(runtime.step())));
    assert!(result.is_err());

    assert_eq!(runtime.controller().mode(), Mode::Off);
    let events = log.events();
    assert_eq!(
        events[events.len() - 4..],
        [
            Event::Duty(0x01),
            Event::Disable,
            Event::Sleep(SleepDepth::Deep),
            Event::Restart,
        ]
    );

    // Tick source is off once powered down
    let counter = ticks.sleep_counter();
    ticks.on_tick();
    assert_eq!(ticks.sleep_counter(), counter);
}
