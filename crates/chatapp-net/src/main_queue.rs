//! UI-confined completion queue.
//!
//! Network work finishes on runtime worker threads; anything that touches
//! application state is handed to a `MainQueue` and runs when the owner of
//! the paired `MainLoop` drains it.
//!
//! Only callback-style callers (`RequestExecutor::execute_with_completion`)
//! need the queue. `async` callers such as the view-models await
//! `RequestExecutor::execute`, which does the work on a spawned task and
//! resumes them on their own task, so state is never touched from a worker.

use tokio::sync::mpsc;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Sending half. Cheap to clone and safe to move into request tasks.
#[derive(Clone)]
pub struct MainQueue {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving half, owned by the UI loop.
pub struct MainLoop {
    rx: mpsc::UnboundedReceiver<Job>,
}

pub fn main_queue() -> (MainQueue, MainLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MainQueue { tx }, MainLoop { rx })
}

impl MainQueue {
    /// Returns false when the loop is gone; the job is dropped unrun.
    pub fn dispatch<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            debug!("Main loop closed, dropping completion");
            return false;
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl MainLoop {
    /// Run every job already queued without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait for the next job and run it. `false` once every queue handle
    /// has been dropped and nothing is left.
    pub async fn next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn jobs_run_in_dispatch_order() {
        let (queue, mut main_loop) = main_queue();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let seen = seen.clone();
            queue.dispatch(move || seen.lock().unwrap().push(i));
        }

        assert_eq!(main_loop.run_pending(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(main_loop.run_pending(), 0);
    }

    #[test]
    fn dispatch_after_loop_dropped_is_refused() {
        let (queue, main_loop) = main_queue();
        drop(main_loop);
        assert!(queue.is_closed());
        assert!(!queue.dispatch(|| {}));
    }

    #[tokio::test]
    async fn next_runs_job_sent_from_another_task() {
        let (queue, mut main_loop) = main_queue();
        let hit = Arc::new(Mutex::new(false));
        let flag = hit.clone();
        tokio::spawn(async move {
            queue.dispatch(move || *flag.lock().unwrap() = true);
        });

        assert!(main_loop.next().await);
        assert!(*hit.lock().unwrap());
        assert!(!main_loop.next().await);
    }
}
