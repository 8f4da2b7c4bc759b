use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

/// Work posted to the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderTask {
    /// OR the dataset aggregator's current bits into the chart state.
    SyncDataSetState,
    /// Schedule another layout cycle.
    RequestLayout,
}

/// Render-thread end of the task channel. Producers post through a
/// [`RenderQueueHandle`].
#[derive(Debug)]
pub struct RenderQueue {
    sender: Sender<RenderTask>,
    receiver: Receiver<RenderTask>,
}

impl RenderQueue {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    #[must_use]
    pub fn handle(&self) -> RenderQueueHandle {
        RenderQueueHandle {
            sender: self.sender.clone(),
        }
    }

    /// Takes every task posted so far without blocking.
    pub fn drain(&self) -> impl Iterator<Item = RenderTask> + '_ {
        self.receiver.try_iter()
    }
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, thread-safe sender side of a [`RenderQueue`].
#[derive(Debug, Clone)]
pub struct RenderQueueHandle {
    sender: Sender<RenderTask>,
}

impl RenderQueueHandle {
    /// Returns `false` once the owning queue is gone.
    pub fn post(&self, task: RenderTask) -> bool {
        self.sender.send(task).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::{RenderQueue, RenderTask};

    #[test]
    fn tasks_posted_from_other_threads_are_drained_in_order() {
        let queue = RenderQueue::new();
        let handle = queue.handle();
        thread::spawn(move || {
            assert!(handle.post(RenderTask::SyncDataSetState));
            assert!(handle.post(RenderTask::RequestLayout));
        })
        .join()
        .expect("producer thread");

        let tasks: Vec<RenderTask> = queue.drain().collect();
        assert_eq!(tasks, vec![RenderTask::SyncDataSetState, RenderTask::RequestLayout]);
        assert_eq!(queue.drain().count(), 0);
    }

    #[test]
    fn posting_after_queue_drop_reports_failure() {
        let queue = RenderQueue::new();
        let handle = queue.handle();
        drop(queue);
        assert!(!handle.post(RenderTask::RequestLayout));
    }
}
