//! Fixed-size worker pool for game execution.
//!
//! Games are I/O-bound (remote player latency dominates), so the pool size is
//! decoupled from the core count. One pool is created per tournament and
//! disposed when the tournament ends.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::Context;
use tracing::trace;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let receiver = Arc::clone(&receiver);
            let handle = std::thread::Builder::new()
                .name(format!("table-worker-{index}"))
                .spawn(move || worker_loop(&receiver))
                .expect("spawning worker thread");
            workers.push(handle);
        }

        WorkerPool {
            sender: Some(sender),
            workers,
        }
    }

    /// Queue a job. Fails only when the pool has already shut down; the
    /// caller treats that as fatal.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) -> anyhow::Result<()> {
        self.sender
            .as_ref()
            .context("worker pool already shut down")?
            .send(Box::new(job))
            .ok()
            .context("worker pool rejected submission")
    }

    /// Stop accepting work and wait for the queue to drain.
    pub fn shutdown(mut self) {
        self.join_workers();
    }

    fn join_workers(&mut self) {
        self.sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_workers();
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>) {
    loop {
        // Take the next job while holding the lock, run it without.
        let job = {
            let guard = receiver.lock().unwrap_or_else(|e| e.into_inner());
            guard.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => {
                trace!("work queue closed, worker exiting");
                break;
            }
        }
    }
}
