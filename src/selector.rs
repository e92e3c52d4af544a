//! The animated food draw.
//!
//! A run emits a fixed number of random picks at a fixed cadence. Every pick
//! but the last only updates the displayed candidate; the last one commits
//! and becomes the search keyword.

use crate::catalog;
use crate::events::Event;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSchedule {
    pub interval: Duration,
    pub draws: u32,
}

impl Default for DrawSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            draws: 11,
        }
    }
}

/// Handle to an in-progress draw. Dropping it stops the draw, so no pick
/// can land after the owner is gone.
pub struct SelectorRun {
    id: u64,
    handle: JoinHandle<()>,
}

impl SelectorRun {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for SelectorRun {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a draw that posts [`Event::FoodDraw`] to `tx`.
///
/// Must be called from within a tokio runtime.
pub fn start(id: u64, schedule: DrawSchedule, tx: UnboundedSender<Event>, mut rng: StdRng) -> SelectorRun {
    // A zero period would panic inside the task and zero draws would never commit.
    let interval = schedule.interval.max(Duration::from_millis(1));
    let draws = schedule.draws.max(1);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; the first draw waits a full interval.
        ticker.tick().await;

        for n in 1..=draws {
            ticker.tick().await;
            let option = catalog::draw(&mut rng);
            let committed = n == draws;
            debug!("Draw {}/{} of run {}: {}", n, draws, id, option.query);
            if tx.send(Event::FoodDraw { run: id, option, committed }).is_err() {
                break;
            }
        }
    });

    SelectorRun { id, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    fn collect(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<(u64, &'static str, bool)> {
        let mut draws = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Event::FoodDraw { run, option, committed } = event {
                draws.push((run, option.query, committed));
            }
        }
        draws
    }

    #[tokio::test(start_paused = true)]
    async fn emits_eleven_draws_and_commits_only_the_last() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();
        let run = start(1, DrawSchedule::default(), tx, StdRng::seed_from_u64(42));

        let mut stamps = Vec::new();
        let mut draws = Vec::new();
        while let Some(event) = rx.recv().await {
            if let Event::FoodDraw { run, option, committed } = event {
                stamps.push(started.elapsed());
                draws.push((run, option.query, committed));
            }
        }

        drop(run);
        assert_eq!(draws.len(), 11);
        assert!(draws.iter().all(|(id, _, _)| *id == 1));
        assert_eq!(draws.iter().filter(|(_, _, c)| *c).count(), 1);
        assert!(draws[10].2);
        for (i, stamp) in stamps.iter().enumerate() {
            assert_eq!(*stamp, Duration::from_millis(100 * (i as u64 + 1)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_run_stops_further_draws() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let run = start(7, DrawSchedule::default(), tx, StdRng::seed_from_u64(1));

        tokio::time::sleep(Duration::from_millis(350)).await;
        drop(run);
        tokio::time::sleep(Duration::from_secs(2)).await;

        let draws = collect(&mut rx);
        assert_eq!(draws.len(), 3);
        assert!(draws.iter().all(|(_, _, committed)| !committed));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_schedule_is_honoured() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let schedule = DrawSchedule {
            interval: Duration::from_millis(50),
            draws: 3,
        };
        let _run = start(2, schedule, tx, StdRng::seed_from_u64(3));
        tokio::time::sleep(Duration::from_millis(500)).await;

        let draws = collect(&mut rx);
        assert_eq!(draws.len(), 3);
        assert_eq!(draws.iter().map(|d| d.2).collect::<Vec<_>>(), [false, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_still_finishes_with_a_commit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let schedule = DrawSchedule {
            interval: Duration::ZERO,
            draws: 0,
        };
        let _run = start(4, schedule, tx, StdRng::seed_from_u64(9));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let draws = collect(&mut rx);
        assert_eq!(draws.len(), 1);
        assert!(draws[0].2);
    }
}
