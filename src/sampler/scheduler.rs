use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::Sampler;

/// Owns the single timer driving a [`Sampler`].
///
/// Each tick is spawned as its own task, so a slow response does not delay
/// the next ping. Restarting aborts the previous timer before the new one
/// is spawned; in-flight ticks from the old timer may still land.
pub struct Scheduler {
    sampler: Arc<Sampler>,
    interval: Option<Duration>,
    timer: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(sampler: Arc<Sampler>) -> Self {
        Self {
            sampler,
            interval: None,
            timer: None,
        }
    }

    /// Idle → Running, or restart with a new interval when already running.
    pub fn start(&mut self, interval: Duration) {
        self.stop();
        // tokio panics on a zero period
        let interval = interval.max(Duration::from_millis(1));

        let sampler = self.sampler.clone();
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First fire is one full interval after start
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let sampler = sampler.clone();
                tokio::spawn(async move {
                    // Failures are already reflected in the sampler status
                    let _ = sampler.tick().await;
                });
            }
        }));
        self.interval = Some(interval);

        info!(
            client_id = self.sampler.client_id(),
            interval_ms = interval.as_millis() as u64,
            "sampler running"
        );
    }

    /// Apply an interval change by cancelling and replacing the timer.
    pub fn set_interval(&mut self, interval: Duration) {
        self.start(interval);
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn sampler(&self) -> &Arc<Sampler> {
        &self.sampler
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::Status;

    fn scheduler() -> Scheduler {
        let sampler =
            Sampler::new("http://127.0.0.1:9", Some("sched".into()), Duration::from_millis(200))
                .unwrap();
        Scheduler::new(Arc::new(sampler))
    }

    #[tokio::test]
    async fn restart_replaces_the_timer() {
        let mut s = scheduler();
        assert!(!s.is_running());

        s.start(Duration::from_millis(500));
        assert!(s.is_running());
        assert_eq!(s.interval(), Some(Duration::from_millis(500)));

        s.set_interval(Duration::from_millis(200));
        assert!(s.is_running());
        assert_eq!(s.interval(), Some(Duration::from_millis(200)));

        s.stop();
        assert!(!s.is_running());
        assert_eq!(s.interval(), None);
    }

    #[tokio::test]
    async fn failing_ticks_keep_the_timer_alive() {
        let mut s = scheduler();
        let mut rx = s.sampler().subscribe();
        s.start(Duration::from_millis(100));

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("a tick should publish")
            .unwrap();

        assert!(matches!(rx.borrow().status, Status::Error { .. }));
        assert!(s.is_running());
    }
}
