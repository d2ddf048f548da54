//! # Task Management System
//!
//! The background worker pool that moves chunk persistence and tile-image
//! work off the main tick thread.
//!
//! ## Architecture Overview
//!
//! * `TaskManager`: owns the worker threads and distributes tasks
//! * `Task` / `TaskResult`: a unit of work and its main-thread completion
//! * `TaskExecutor`: the fire-and-forget submission interface producers see
//!
//! Each worker thread gets a dedicated channel pair with at most one task in
//! flight. Every submission passes through a single FIFO queue and dispatch
//! always takes the queue front, so tasks start in submission order; tasks
//! that find every channel busy stay queued. Dispatch is round-robin across
//! channels.
//!
//! ## Task Lifecycle
//! 1. A producer calls [`TaskExecutor::add_task`]
//! 2. The manager sends the task to an idle worker (or queues it)
//! 3. The worker runs `Task::process` and sends back a `TaskResult`
//! 4. `process_completed_tasks`, called from the tick loop, runs each
//!    result's `on_complete` on the main thread and publishes any follow-up
//!    tasks
//! 5. `process_queued_tasks` drains the overflow queue as workers free up
//!
//! Submission is fire-and-forget: there is no cancellation of in-flight
//! tasks, and shutdown does not wait for workers to drain - flushing is the
//! embedding application's concern.

pub mod task;

use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

/// The submission interface producers depend on.
///
/// The chunk manager holds its executor as `Arc<dyn TaskExecutor>`, which is
/// what lets tests swap in a recording executor and the host swap in its own
/// scheduler if it has one.
pub trait TaskExecutor: Send + Sync {
    /// Enqueues a task for asynchronous execution. Never blocks; tasks that
    /// cannot be dispatched immediately are queued.
    fn add_task(&self, task: Box<dyn Task>);
}

/// Maximum number of tasks in flight per worker channel.
///
/// One in-flight task per channel, combined with dispatching strictly from
/// the queue front, keeps tasks starting in submission order.
const MAX_TASKS_IN_FLIGHT: usize = 1;

/// A communication channel between the main thread and one worker thread.
struct TaskChannel {
    task_sender: Sender<Box<dyn Task>>,
    result_receiver: Receiver<Box<dyn TaskResult>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

struct TaskManagerState {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task>>,
    current_channel: usize,
}

/// Manages the pool of worker threads and coordinates task execution.
///
/// Internals sit behind a single mutex so the manager can serve
/// [`TaskExecutor::add_task`] through a shared reference from any producer
/// thread. The completion pump ([`TaskManager::process_completed_tasks`])
/// must only be called from the main thread - that is the contract that puts
/// `TaskResult::on_complete` back on the thread that owns engine state.
pub struct TaskManager {
    inner: Mutex<TaskManagerState>,
}

impl TaskManager {
    /// Creates a manager with `num_workers` worker threads.
    ///
    /// With zero workers every task queues forever; useful only for hosts
    /// that drain the queue through an executor of their own, so a warning is
    /// logged.
    pub fn new(num_workers: usize) -> Self {
        if num_workers == 0 {
            warn!("task manager created with no workers; tasks will only queue");
        }

        let mut channels = Vec::with_capacity(num_workers);
        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult>>();

            let worker = thread::spawn(move || {
                debug!("map worker {worker_index} started");
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
                debug!("map worker {worker_index} stopped");
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            inner: Mutex::new(TaskManagerState {
                channels,
                queued_tasks: VecDeque::new(),
                current_channel: 0,
            }),
        }
    }

    /// Attempts to dispatch queued tasks to idle workers.
    ///
    /// Call once per tick alongside [`Self::process_completed_tasks`]; tasks
    /// stay queued while every channel is busy.
    pub fn process_queued_tasks(&self) {
        self.inner.lock().unwrap().dispatch_queued();
    }

    /// Drains every finished task's result and runs its completion phase.
    ///
    /// Must be called from the main thread. Follow-up tasks spawned by
    /// completions are published before returning.
    pub fn process_completed_tasks(&self) {
        let mut finished = Vec::new();
        {
            let mut state = self.inner.lock().unwrap();
            for channel in &mut state.channels {
                while let Ok(result) = channel.result_receiver.try_recv() {
                    channel.num_tasks_in_flight -= 1;
                    finished.push(result);
                }
            }
        }

        // Completions run outside the lock: they may submit follow-up work
        // through this same manager.
        for result in finished {
            for follow_up in result.on_complete() {
                self.add_task(follow_up);
            }
        }
    }

    /// Number of tasks waiting in the overflow queue.
    pub fn queued_len(&self) -> usize {
        self.inner.lock().unwrap().queued_tasks.len()
    }
}

impl TaskExecutor for TaskManager {
    fn add_task(&self, task: Box<dyn Task>) {
        let mut state = self.inner.lock().unwrap();
        // Always go through the queue: dispatching the new task directly
        // would let it jump ahead of tasks still waiting from earlier
        // submissions, breaking per-producer FIFO order.
        state.queued_tasks.push_back(task);
        state.dispatch_queued();
    }
}

impl TaskManagerState {
    /// Sends tasks from the queue front to idle workers, oldest first, until
    /// the queue is empty or every channel is busy.
    fn dispatch_queued(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                }
                Err(task) => {
                    // Worker side disconnected; put the task back and stop.
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Round-robin scan for a channel below its in-flight limit, starting at
    /// the channel after the last dispatch.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        if count == 0 {
            return None;
        }
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    fn try_send_task(
        &mut self,
        task: Box<dyn Task>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(()) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(send_error) => Err(send_error.0),
        }
    }
}
