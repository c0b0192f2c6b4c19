// ═══ End-to-end dispatch scenarios (§8) ═══
//
// Exercises DispatchEngine + WorkerRegistry together through an in-memory
// TaskSink, the way the corpus's kernel integration tests drive a whole
// subsystem through its public API rather than one module at a time.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use dispatch_kernel::{DispatchEngine, EngineConfig, ProgressBus, Task, TaskSink, WorkerId, WorkerRegistry};
use uuid::Uuid;

struct ChannelSink {
    delivered: StdMutex<Vec<(WorkerId, Task)>>,
}

impl ChannelSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            delivered: StdMutex::new(Vec::new()),
        })
    }

    fn drain(&self) -> Vec<(WorkerId, Task)> {
        std::mem::take(&mut self.delivered.lock().unwrap())
    }
}

#[async_trait]
impl TaskSink for ChannelSink {
    async fn send_function(&self, _worker: WorkerId, _f_blob: &[u8]) {}

    async fn send_task(&self, worker: WorkerId, task: &Task) {
        self.delivered.lock().unwrap().push((worker, task.clone()));
    }
}

fn tasks(n: u32) -> Vec<Task> {
    (0..n)
        .map(|i| Task {
            index: i,
            payload: vec![i as u8],
        })
        .collect()
}

/// Scenario: two workers connect before the session starts, the session
/// maps five inputs, and both workers help drain the queue.
#[tokio::test]
async fn two_workers_share_the_work() {
    let sink = ChannelSink::new();
    let engine = DispatchEngine::new(
        EngineConfig {
            chunk_size: 1,
            ..Default::default()
        },
        sink.clone(),
        ProgressBus::new(16),
    );
    let registry = WorkerRegistry::new(engine.clone());

    let worker_a = Uuid::new_v4();
    let worker_b = Uuid::new_v4();
    registry.on_connect(worker_a, "10.0.0.1:1".into()).await;
    registry.on_connect(worker_b, "10.0.0.2:1".into()).await;

    engine.begin_session(vec![], tasks(5)).await.unwrap();
    registry.on_ready(worker_a).await;
    registry.on_ready(worker_b).await;

    let run = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run_until_drained().await }
    });

    let mut remaining = 5;
    while remaining > 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        for (worker, task) in sink.drain() {
            registry.on_result(worker, task.index, vec![task.index as u8 * 2]).await;
            remaining -= 1;
        }
    }

    let results = run.await.unwrap().unwrap();
    assert_eq!(results.len(), 5);
    for (index, payload) in &results {
        assert_eq!(payload, &vec![*index as u8 * 2]);
    }
}

/// Scenario: a worker connects after the session has already started and
/// still receives the function and joins the ready queue.
#[tokio::test]
async fn late_joining_worker_receives_function_and_becomes_ready() {
    let sink = ChannelSink::new();
    let engine = DispatchEngine::new(EngineConfig::default(), sink.clone(), ProgressBus::new(16));
    let registry = WorkerRegistry::new(engine.clone());

    engine.begin_session(vec![9, 9, 9], tasks(1)).await.unwrap();

    let worker = Uuid::new_v4();
    registry.on_connect(worker, "10.0.0.3:1".into()).await;

    assert!(engine.worker_is_ready(worker).await);

    let run = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run_until_drained().await }
    });

    loop {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let sent = sink.drain();
        for (w, task) in sent {
            registry.on_result(w, task.index, vec![1]).await;
        }
        if run.is_finished() {
            break;
        }
    }

    let results = run.await.unwrap().unwrap();
    assert_eq!(results, vec![(0, vec![1])]);
}

/// Scenario: a worker disconnects mid-flight; its task is reclaimed by the
/// timeout path and finished by a different worker.
#[tokio::test]
async fn disconnecting_worker_does_not_lose_its_task() {
    let sink = ChannelSink::new();
    let engine = DispatchEngine::new(
        EngineConfig {
            chunk_size: 1,
            timeout: Duration::from_millis(50),
            ..Default::default()
        },
        sink.clone(),
        ProgressBus::new(16),
    );
    let registry = WorkerRegistry::new(engine.clone());

    engine.begin_session(vec![], tasks(1)).await.unwrap();

    let worker_a = Uuid::new_v4();
    registry.on_connect(worker_a, "10.0.0.4:1".into()).await;
    registry.on_ready(worker_a).await;

    let run = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run_until_drained().await }
    });

    // Give the dispatch loop a moment to assign the task to worker_a, then
    // drop the connection without ever answering.
    tokio::time::sleep(Duration::from_millis(20)).await;
    registry.on_disconnect(worker_a).await;

    let worker_b = Uuid::new_v4();
    tokio::time::sleep(Duration::from_millis(200)).await;
    registry.on_connect(worker_b, "10.0.0.5:1".into()).await;
    registry.on_ready(worker_b).await;

    loop {
        tokio::time::sleep(Duration::from_millis(10)).await;
        for (worker, task) in sink.drain() {
            if worker == worker_b {
                registry.on_result(worker, task.index, vec![7]).await;
            }
        }
        if run.is_finished() {
            break;
        }
    }

    let results = run.await.unwrap().unwrap();
    assert_eq!(results, vec![(0, vec![7])]);
}
