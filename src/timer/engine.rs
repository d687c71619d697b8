//! Timer state machine
//!
//! The engine pulls phases from a [`PhaseQueue`] one at a time, measures
//! elapsed time against an injected [`Clock`] and pushes a [`Frame`] to a
//! [`RenderSink`] on every transition and tick. The periodic wake-up itself
//! is owned by a [`Schedule`] so the engine never touches a runtime.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Clock, Frame, Mode, PhaseQueue, PhaseSpec, Templates};

/// Period of the recurring tick while running
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The two states of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Running,
}

/// The single recurring wake-up that drives `tick()`
pub trait Schedule: Send {
    /// Arm the recurring wake-up, replacing any previous one
    fn start(&mut self, period: Duration);
    /// Disarm the wake-up; a no-op when nothing is armed
    fn cancel(&mut self);
}

/// Receives a frame whenever the visible state changes. Must not block.
pub trait RenderSink: Send {
    fn render(&self, frame: &Frame);
}

/// Point-in-time view of the engine for status reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub state: EngineState,
    pub mode: Option<Mode>,
    pub active_phase: Option<PhaseSpec>,
    pub upcoming_phase: Option<PhaseSpec>,
    pub seconds_remaining: i64,
    pub queued: usize,
}

/// Drives one run at a time through a template's phases
pub struct TimerEngine {
    templates: Templates,
    queue: PhaseQueue,
    state: EngineState,
    mode: Option<Mode>,
    active_phase: Option<PhaseSpec>,
    // Popped by the stop path and shown while idle
    upcoming_phase: Option<PhaseSpec>,
    phase_started_at: Option<DateTime<Utc>>,
    seconds_remaining: i64,
    clock: Box<dyn Clock>,
    schedule: Box<dyn Schedule>,
    sink: Box<dyn RenderSink>,
}

impl TimerEngine {
    pub fn new(
        templates: Templates,
        clock: Box<dyn Clock>,
        schedule: Box<dyn Schedule>,
        sink: Box<dyn RenderSink>,
    ) -> Self {
        Self {
            templates,
            queue: PhaseQueue::new(),
            state: EngineState::Idle,
            mode: None,
            active_phase: None,
            upcoming_phase: None,
            phase_started_at: None,
            seconds_remaining: 0,
            clock,
            schedule,
            sink,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Mode of the current or most recent run
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn active_phase(&self) -> Option<&PhaseSpec> {
        self.active_phase.as_ref()
    }

    pub fn seconds_remaining(&self) -> i64 {
        self.seconds_remaining
    }

    pub fn queue(&self) -> &PhaseQueue {
        &self.queue
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Start a run if idle, stop the current run otherwise
    pub fn toggle(&mut self, mode: Mode) {
        match self.state {
            EngineState::Idle => self.start(mode),
            EngineState::Running => self.stop(),
        }
    }

    /// Rebuild the queue from the mode's template and begin its first phase.
    ///
    /// Calling this while running restarts: the outstanding schedule is
    /// cancelled before a new one is armed.
    pub fn start(&mut self, mode: Mode) {
        if self.is_running() {
            info!("Start requested while running, restarting with {} sequence", mode.as_str());
            self.schedule.cancel();
            self.state = EngineState::Idle;
        }

        self.mode = Some(mode);
        self.queue.refill(self.templates.sequence(mode));
        self.upcoming_phase = None;

        let Some(phase) = self.queue.pop() else {
            info!("{} sequence is empty, nothing to run", mode.as_str());
            self.active_phase = None;
            self.phase_started_at = None;
            self.seconds_remaining = 0;
            self.render();
            return;
        };

        info!(
            "Starting {} sequence: {} for {}s ({} queued)",
            mode.as_str(),
            phase.name,
            phase.duration_seconds,
            self.queue.count()
        );

        self.phase_started_at = Some(self.clock.now());
        self.seconds_remaining = phase.signed_duration();
        self.active_phase = Some(phase);
        self.state = EngineState::Running;

        // Show the full duration right away instead of after the first period
        self.tick();

        if self.is_running() {
            self.schedule.start(TICK_PERIOD);
        }
    }

    /// Recompute remaining time from the clock and render.
    ///
    /// Ends the run once the active phase has expired. Ignored while idle.
    pub fn tick(&mut self) {
        if !self.is_running() {
            debug!("Tick ignored while idle");
            return;
        }
        let (Some(phase), Some(started_at)) = (&self.active_phase, self.phase_started_at) else {
            return;
        };

        let elapsed = (self.clock.now() - started_at).num_seconds();
        self.seconds_remaining = phase.signed_duration().saturating_sub(elapsed);
        debug!("Tick: {} has {}s remaining", phase.name, self.seconds_remaining);

        self.render();

        if self.seconds_remaining <= 0 {
            info!("Phase {} expired, returning to idle", phase.name);
            self.stop();
        }
    }

    /// Cancel the schedule and return to idle. A no-op while idle.
    ///
    /// The next queued phase is popped as the upcoming phase and its full
    /// duration becomes the idle display. A following `start` always rebuilds
    /// the queue, so this pop never changes what runs next.
    pub fn stop(&mut self) {
        if !self.is_running() {
            debug!("Stop ignored while idle");
            return;
        }

        self.schedule.cancel();
        self.active_phase = None;
        self.phase_started_at = None;

        self.upcoming_phase = self.queue.pop();
        if let Some(next) = &self.upcoming_phase {
            self.seconds_remaining = next.signed_duration();
        }

        self.state = EngineState::Idle;
        info!("Timer stopped ({} phases left in queue)", self.queue.count());

        self.render();
    }

    /// The frame describing the current state
    pub fn frame(&self) -> Frame {
        let phase_name = match self.state {
            EngineState::Running => self.active_phase.as_ref(),
            EngineState::Idle => self.upcoming_phase.as_ref(),
        }
        .map(|phase| phase.name.clone());

        Frame::new(self.state, self.seconds_remaining, phase_name)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state,
            mode: self.mode,
            active_phase: self.active_phase.clone(),
            upcoming_phase: self.upcoming_phase.clone(),
            seconds_remaining: self.seconds_remaining,
            queued: self.queue.count(),
        }
    }

    fn render(&self) {
        self.sink.render(&self.frame());
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("active_phase", &self.active_phase)
            .field("seconds_remaining", &self.seconds_remaining)
            .field("queued", &self.queue.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::timer::ManualClock;

    #[derive(Debug, Default)]
    struct ScheduleLog {
        armed: bool,
        starts: usize,
        cancels: usize,
        // Most schedules ever armed at once
        max_armed: usize,
    }

    #[derive(Clone, Default)]
    struct RecordingSchedule(Arc<Mutex<ScheduleLog>>);

    impl Schedule for RecordingSchedule {
        fn start(&mut self, period: Duration) {
            assert_eq!(period, TICK_PERIOD);
            let mut log = self.0.lock().unwrap();
            let armed = if log.armed { 2 } else { 1 };
            log.max_armed = log.max_armed.max(armed);
            log.armed = true;
            log.starts += 1;
        }

        fn cancel(&mut self) {
            let mut log = self.0.lock().unwrap();
            log.armed = false;
            log.cancels += 1;
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<Frame>>>);

    impl RecordingSink {
        fn frames(&self) -> Vec<Frame> {
            self.0.lock().unwrap().clone()
        }

        fn last(&self) -> Frame {
            self.frames().last().cloned().unwrap()
        }
    }

    impl RenderSink for RecordingSink {
        fn render(&self, frame: &Frame) {
            self.0.lock().unwrap().push(frame.clone());
        }
    }

    struct Harness {
        engine: TimerEngine,
        clock: ManualClock,
        schedule: RecordingSchedule,
        sink: RecordingSink,
    }

    fn harness_with(templates: Templates) -> Harness {
        let clock = ManualClock::default();
        let schedule = RecordingSchedule::default();
        let sink = RecordingSink::default();
        let engine = TimerEngine::new(
            templates,
            Box::new(clock.clone()),
            Box::new(schedule.clone()),
            Box::new(sink.clone()),
        );
        Harness {
            engine,
            clock,
            schedule,
            sink,
        }
    }

    fn harness() -> Harness {
        harness_with(Templates::default())
    }

    #[test]
    fn starts_idle() {
        let h = harness();
        assert_eq!(h.engine.state(), EngineState::Idle);
        assert!(h.engine.active_phase().is_none());
        assert_eq!(h.engine.frame(), Frame::idle());
    }

    #[test]
    fn start_work_renders_full_duration_immediately() {
        let mut h = harness();
        h.engine.start(Mode::Work);

        assert_eq!(h.engine.state(), EngineState::Running);
        assert_eq!(h.engine.seconds_remaining(), 1500);
        assert_eq!(h.engine.active_phase().map(PhaseSpec::name), Some("Work"));
        assert_eq!(h.engine.queue().count(), 1);

        let frame = h.sink.last();
        assert_eq!(frame.display_text, "25:00");
        assert_eq!(frame.button_label, "STOP");
        assert_eq!(frame.phase_name.as_deref(), Some("Work"));

        let log = h.schedule.0.lock().unwrap();
        assert!(log.armed);
        assert_eq!(log.starts, 1);
    }

    #[test]
    fn remaining_follows_wall_clock() {
        let mut h = harness();
        h.engine.start(Mode::Work);

        let mut elapsed = 0;
        for t in [1, 59, 60, 61, 754, 1499] {
            h.clock.advance_secs(t - elapsed);
            elapsed = t;
            h.engine.tick();
            assert_eq!(h.engine.seconds_remaining(), 1500 - t);
            assert_eq!(h.engine.state(), EngineState::Running);
        }
    }

    #[test]
    fn partial_seconds_are_floored() {
        let mut h = harness();
        h.engine.start(Mode::Work);

        h.clock.advance_millis(1999);
        h.engine.tick();
        assert_eq!(h.engine.seconds_remaining(), 1499);
        assert_eq!(h.sink.last().display_text, "24:59");
    }

    #[test]
    fn missed_ticks_do_not_drift() {
        let mut h = harness();
        h.engine.start(Mode::Work);

        // Only one tick fires across ten minutes
        h.clock.advance_secs(600);
        h.engine.tick();
        assert_eq!(h.engine.seconds_remaining(), 900);
        assert_eq!(h.sink.last().display_text, "15:00");
    }

    #[test]
    fn expiry_returns_to_idle_without_advancing() {
        let mut h = harness();
        h.engine.start(Mode::Work);

        h.clock.advance_secs(1500);
        h.engine.tick();

        assert_eq!(h.engine.state(), EngineState::Idle);
        assert!(h.engine.active_phase().is_none());

        let frame = h.sink.last();
        assert_eq!(frame.button_label, "START WORK");
        assert_eq!(frame.break_button_label, "START BREAK");
        // The rest phase was popped as the upcoming phase
        assert_eq!(frame.display_text, "05:00");
        assert_eq!(frame.phase_name.as_deref(), Some("Rest"));
        assert!(h.engine.queue().is_empty());

        let log = h.schedule.0.lock().unwrap();
        assert!(!log.armed);
    }

    #[test]
    fn late_tick_past_expiry_still_stops() {
        let mut h = harness();
        h.engine.start(Mode::Work);

        h.clock.advance_secs(1503);
        h.engine.tick();

        let frames = h.sink.frames();
        let expired = &frames[frames.len() - 2];
        assert_eq!(expired.display_text, "00:00");
        assert_eq!(h.engine.state(), EngineState::Idle);
    }

    #[test]
    fn stop_mid_phase_renders_once_and_disarms() {
        let mut h = harness();
        h.engine.start(Mode::Break);
        assert_eq!(h.sink.last().display_text, "05:00");
        assert_eq!(h.engine.active_phase().map(PhaseSpec::name), Some("Rest"));

        h.clock.advance_secs(42);
        h.engine.tick();
        let before = h.sink.frames().len();

        h.engine.stop();
        assert_eq!(h.engine.state(), EngineState::Idle);
        assert_eq!(h.sink.frames().len(), before + 1);
        assert_eq!(h.sink.last().button_label, "START WORK");

        // No further ticks land once idle
        h.clock.advance_secs(10);
        h.engine.tick();
        assert_eq!(h.sink.frames().len(), before + 1);
        assert!(!h.schedule.0.lock().unwrap().armed);
    }

    #[test]
    fn stop_twice_equals_stop_once() {
        let mut h = harness();
        h.engine.start(Mode::Break);
        h.engine.stop();
        let snapshot = h.engine.snapshot();
        let frames = h.sink.frames().len();

        h.engine.stop();
        assert_eq!(h.engine.snapshot(), snapshot);
        assert_eq!(h.sink.frames().len(), frames);
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let mut h = harness();
        h.engine.stop();
        assert_eq!(h.engine.state(), EngineState::Idle);
        assert!(h.sink.frames().is_empty());
        assert_eq!(h.schedule.0.lock().unwrap().cancels, 0);
    }

    #[test]
    fn restart_while_running_keeps_one_schedule() {
        let mut h = harness();
        h.engine.start(Mode::Work);
        h.clock.advance_secs(100);
        h.engine.start(Mode::Work);

        assert_eq!(h.engine.seconds_remaining(), 1500);
        assert_eq!(h.engine.queue().count(), 1);

        let log = h.schedule.0.lock().unwrap();
        assert_eq!(log.starts, 2);
        assert_eq!(log.cancels, 1);
        assert_eq!(log.max_armed, 1);
    }

    #[test]
    fn start_rebuilds_queue_after_stop() {
        let mut h = harness();
        h.engine.start(Mode::Break);
        h.engine.stop();
        assert_eq!(h.engine.queue().count(), 6);

        h.engine.start(Mode::Break);
        assert_eq!(h.engine.active_phase().map(PhaseSpec::name), Some("Rest"));
        assert_eq!(h.engine.queue().count(), 7);
    }

    #[test]
    fn toggle_switches_between_states() {
        let mut h = harness();
        h.engine.toggle(Mode::Work);
        assert!(h.engine.is_running());
        assert_eq!(h.engine.mode(), Some(Mode::Work));

        // Either control stops whatever is running
        h.engine.toggle(Mode::Break);
        assert!(!h.engine.is_running());
        assert_eq!(h.engine.mode(), Some(Mode::Work));

        h.engine.toggle(Mode::Break);
        assert!(h.engine.is_running());
        assert_eq!(h.engine.mode(), Some(Mode::Break));
        assert_eq!(h.sink.last().display_text, "05:00");
    }

    #[test]
    fn empty_template_stays_idle() {
        let mut h = harness_with(Templates::new(Vec::new(), Templates::default_break()));
        h.engine.start(Mode::Work);

        assert_eq!(h.engine.state(), EngineState::Idle);
        assert_eq!(h.sink.last().display_text, "00:00");
        assert_eq!(h.schedule.0.lock().unwrap().starts, 0);
    }

    #[test]
    fn zero_duration_phase_ends_immediately() {
        let templates = Templates::new(
            vec![PhaseSpec::new("Blink", 0), PhaseSpec::new("Rest", 5)],
            Vec::new(),
        );
        let mut h = harness_with(templates);
        h.engine.start(Mode::Work);

        assert_eq!(h.engine.state(), EngineState::Idle);
        assert_eq!(h.sink.last().display_text, "00:05");
        assert_eq!(h.schedule.0.lock().unwrap().starts, 0);
    }

    #[test]
    fn stop_with_empty_queue_keeps_last_display() {
        let templates = Templates::new(vec![PhaseSpec::new("Solo", 90)], Vec::new());
        let mut h = harness_with(templates);
        h.engine.start(Mode::Work);
        h.clock.advance_secs(30);
        h.engine.tick();
        h.engine.stop();

        assert_eq!(h.sink.last().display_text, "01:00");
        assert!(h.sink.last().phase_name.is_none());
    }

    #[test]
    fn oversized_duration_runs_instead_of_expiring() {
        let templates = Templates::new(vec![PhaseSpec::new("Long", u64::MAX)], Vec::new());
        let mut h = harness_with(templates);
        h.engine.start(Mode::Work);

        assert_eq!(h.engine.state(), EngineState::Running);
        assert_eq!(h.engine.seconds_remaining(), i64::MAX);

        h.clock.advance_secs(10);
        h.engine.tick();
        assert_eq!(h.engine.seconds_remaining(), i64::MAX - 10);
    }

    #[test]
    fn clock_stepping_backwards_does_not_overflow() {
        let templates = Templates::new(vec![PhaseSpec::new("Long", u64::MAX)], Vec::new());
        let mut h = harness_with(templates);
        h.engine.start(Mode::Work);

        h.clock.advance_secs(-1_000_000);
        h.engine.tick();
        assert_eq!(h.engine.seconds_remaining(), i64::MAX);
        assert_eq!(h.engine.state(), EngineState::Running);
    }

    #[test]
    fn snapshot_reports_queue_and_phase() {
        let mut h = harness();
        h.engine.start(Mode::Break);

        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.state, EngineState::Running);
        assert_eq!(snapshot.mode, Some(Mode::Break));
        assert_eq!(snapshot.queued, 7);
        assert_eq!(snapshot.seconds_remaining, 300);
        assert!(snapshot.upcoming_phase.is_none());
    }
}
