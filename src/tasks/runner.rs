//! Background task runner
//!
//! A task runs on its own worker thread. Its progress messages and its final
//! outcome travel over one channel to the thread waiting on the
//! [`TaskHandle`], so the waiter sees the messages in the order they were
//! published and the outcome after all of them. A started task cannot be
//! cancelled.

use std::any::Any;
use std::sync::mpsc;
use std::thread;

use tracing::{error, info};

use crate::error::TallyResult;

use super::outcome::{TaskFailure, TaskOutcome};

/// A unit of background work
pub trait BackgroundTask: Send + 'static {
    type Output: Send + 'static;

    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Do the work, publishing progress through `progress`
    fn run(self, progress: &Progress) -> TallyResult<Self::Output>;
}

/// Publishes progress messages of a running task
pub struct Progress {
    publish: Box<dyn Fn(String) + Send>,
}

impl Progress {
    /// Progress that calls `publish` for every message
    pub fn from_fn<F>(publish: F) -> Self
    where
        F: Fn(String) + Send + 'static,
    {
        Self {
            publish: Box::new(publish),
        }
    }

    /// Progress that drops every message
    pub fn silent() -> Self {
        Self::from_fn(|_| {})
    }

    pub fn publish(&self, message: impl Into<String>) {
        (self.publish)(message.into());
    }
}

/// Receives the progress and the outcome of a task on the waiting thread
pub trait TaskListener<T> {
    fn on_progress(&mut self, _message: &str) {}

    /// Called exactly once, after every progress message
    fn on_completed(&mut self, outcome: &TaskOutcome<T>);
}

enum TaskMessage<T> {
    Progress(String),
    Completed(TaskOutcome<T>),
}

/// Handle to a task running in the background
pub struct TaskHandle<T> {
    name: &'static str,
    receiver: mpsc::Receiver<TaskMessage<T>>,
    worker: thread::JoinHandle<()>,
}

/// Start `task` on a worker thread
pub fn spawn<B: BackgroundTask>(task: B) -> TaskHandle<B::Output> {
    let name = task.name();
    let (sender, receiver) = mpsc::channel();

    let worker = {
        let progress_sender = sender.clone();
        thread::spawn(move || {
            info!(task = name, "Task started");
            let progress = Progress::from_fn(move |message| {
                // The waiter may have gone away; the task still runs to the end
                let _ = progress_sender.send(TaskMessage::Progress(message));
            });
            let outcome = TaskOutcome::from_result(task.run(&progress));
            let _ = sender.send(TaskMessage::Completed(outcome));
        })
    };

    TaskHandle {
        name,
        receiver,
        worker,
    }
}

impl<T> TaskHandle<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Block until the task ends, forwarding progress to `listener`
    ///
    /// `listener.on_completed` is called exactly once. A worker that panics
    /// ends in a `Failure`.
    pub fn wait<L: TaskListener<T>>(self, listener: &mut L) -> TaskOutcome<T> {
        let TaskHandle {
            name,
            receiver,
            worker,
        } = self;

        let outcome = loop {
            match receiver.recv() {
                Ok(TaskMessage::Progress(message)) => listener.on_progress(&message),
                Ok(TaskMessage::Completed(outcome)) => {
                    let _ = worker.join();
                    break outcome;
                }
                Err(_) => {
                    let message = match worker.join() {
                        Err(payload) => format!("Task {} panicked: {}", name, panic_message(&payload)),
                        Ok(()) => format!("Task {} ended without a result", name),
                    };
                    break TaskOutcome::Failure(TaskFailure::new(message));
                }
            }
        };

        match &outcome {
            TaskOutcome::Success(_) => info!(task = name, "Task finished"),
            TaskOutcome::NeedsReauth { target, .. } => {
                info!(task = name, target_name = %target, "Task needs authorization")
            }
            TaskOutcome::Failure(failure) => {
                error!(task = name, error = %failure.report(), "Task failed")
            }
        }

        listener.on_completed(&outcome);
        outcome
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `task` in the background and wait for it
pub fn run_task<B, L>(task: B, listener: &mut L) -> TaskOutcome<B::Output>
where
    B: BackgroundTask,
    L: TaskListener<B::Output>,
{
    spawn(task).wait(listener)
}
