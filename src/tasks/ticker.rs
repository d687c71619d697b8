//! Periodic tick schedule and the background task that applies ticks

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::{state::AppState, timer::Schedule};

/// Create the channel that carries ticks from a [`TokioSchedule`] to
/// [`tick_driver_task`]
pub fn tick_channel() -> (TickSender, TickReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let generation = Arc::new(AtomicU64::new(0));
    (
        TickSender {
            tx,
            generation: Arc::clone(&generation),
        },
        TickReceiver { rx, generation },
    )
}

/// Sending half of the tick channel. Every tick is tagged with the
/// generation of the schedule that produced it.
#[derive(Debug, Clone)]
pub struct TickSender {
    tx: mpsc::UnboundedSender<u64>,
    generation: Arc<AtomicU64>,
}

impl TickSender {
    /// Invalidate every tick sent so far and return the new generation
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Receiving half of the tick channel
#[derive(Debug)]
pub struct TickReceiver {
    rx: mpsc::UnboundedReceiver<u64>,
    generation: Arc<AtomicU64>,
}

impl TickReceiver {
    /// Wait for the next tick of the current schedule, dropping ticks left
    /// over from a cancelled one. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<()> {
        loop {
            let generation = self.rx.recv().await?;
            if generation == self.generation.load(Ordering::SeqCst) {
                return Some(());
            }
            debug!("Dropping tick from cancelled schedule {}", generation);
        }
    }
}

/// A [`Schedule`] backed by a tokio interval task.
///
/// Each period the task sends a tick on the channel; [`tick_driver_task`]
/// receives it and advances the engine. At most one interval task exists.
#[derive(Debug)]
pub struct TokioSchedule {
    tick_tx: TickSender,
    handle: Option<JoinHandle<()>>,
}

impl TokioSchedule {
    pub fn new(tick_tx: TickSender) -> Self {
        Self {
            tick_tx,
            handle: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Schedule for TokioSchedule {
    fn start(&mut self, period: Duration) {
        self.cancel();

        let generation = self.tick_tx.next_generation();
        let tx = self.tick_tx.tx.clone();
        debug!("Arming tick schedule {} every {:?}", generation, period);

        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the engine already rendered
            interval.tick().await;

            loop {
                interval.tick().await;
                if tx.send(generation).is_err() {
                    debug!("Tick receiver dropped, ending schedule");
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Cancelling tick schedule");
            handle.abort();
            // Ticks already queued belong to the aborted task
            self.tick_tx.next_generation();
        }
    }
}

impl Drop for TokioSchedule {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Background task that applies scheduled ticks to the engine
pub async fn tick_driver_task(state: Arc<AppState>, mut tick_rx: TickReceiver) {
    info!("Starting tick driver task");

    while tick_rx.recv().await.is_some() {
        if let Err(e) = state.tick() {
            error!("Failed to tick timer engine: {}", e);
        }
    }

    info!("Tick channel closed, tick driver exiting");
}
