use std::future::Future;

use tokio::spawn;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

pub struct TaskManager {
    hold_tx: Mutex<Option<mpsc::Sender<()>>>,
    hold_rx: Mutex<mpsc::Receiver<()>>,
    stop_tx: broadcast::Sender<()>,
}

impl TaskManager {
    pub fn new() -> Self {
        let (hold_tx, hold_rx) = mpsc::channel(1);
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            // Taken out when shutdown begins, after which `spawn` no longer
            // starts anything.
            hold_tx: Mutex::new(Some(hold_tx)),
            hold_rx: Mutex::new(hold_rx),
            stop_tx,
        }
    }

    /// Spawn a task that receives a [`TaskContext`]. Returns `false` if the
    /// manager is already stopping, in which case nothing is started.
    pub async fn spawn<F, T>(&self, f: F) -> bool
    where
        F: FnOnce(TaskContext) -> T + Send + 'static,
        T: Future + Send + 'static,
        T::Output: Send + 'static,
    {
        // Subscribe under the lock so a concurrent `stop` cannot send its
        // signal between handing out the token and subscribing.
        let (hold_tx, stop_rx) = {
            let hold_tx = self.hold_tx.lock().await;
            match hold_tx.as_ref() {
                Some(hold_tx) => (hold_tx.clone(), self.stop_tx.subscribe()),
                None => {
                    tracing::debug!("task manager stopping; not spawning task");
                    return false;
                }
            }
        };

        spawn(async move {
            // The context holds a clone of `hold_tx`; it is released when the
            // task's future completes.
            let task_context = TaskContext {
                _token: hold_tx,
                stop: stop_rx,
            };

            f(task_context).await;
        });
        true
    }

    /// Signal every task to stop and wait until all of them have finished.
    pub async fn stop(&self) {
        // Must drop our own `hold_tx` first, otherwise `recv` below would
        // wait forever. This also makes later calls to `spawn` no-ops, so no
        // task can start after the stop signal went out.
        drop(self.hold_tx.lock().await.take());

        let _ = self.stop_tx.send(());

        // The channel breaks once every task has dropped its token.
        let _ = self.hold_rx.lock().await.recv().await;
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TaskContext {
    stop: broadcast::Receiver<()>,
    _token: mpsc::Sender<()>,
}

impl TaskContext {
    pub async fn wait_for_stop(&mut self) {
        let _ = self.stop.recv().await;
    }
}

#[cfg(test)]
mod tests {

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::TaskManager;

    #[tokio::test]
    async fn stop_waits_for_tasks() {
        let task_manager = TaskManager::new();
        let stopped = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let stopped = stopped.clone();
            assert!(
                task_manager
                    .spawn(move |mut task_context| async move {
                        task_context.wait_for_stop().await;
                        stopped.fetch_add(1, Ordering::SeqCst);
                    })
                    .await
            );
        }

        task_manager.stop().await;
        assert_eq!(stopped.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn spawn_after_stop_is_ignored() {
        let task_manager = TaskManager::new();
        task_manager.stop().await;
        assert!(!task_manager.spawn(|_| async {}).await);
    }
}
