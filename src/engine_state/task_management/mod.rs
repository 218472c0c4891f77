//! # Mesh Worker Pool
//!
//! This module runs chunk meshing on background threads so the thread that owns the
//! world and the renderer never blocks on a full meshing pass.
//!
//! ## Architecture Overview
//!
//! - `MeshWorkerPool`: Central coordinator for task distribution and worker management
//! - `ChunkMeshTask`: One chunk's meshing work, owning its sampled data
//! - `TaskChannel`: Communication channel between the owning thread and one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `MeshWorkerPool::publish_task()`
//! 2. The pool hands tasks to idle workers round-robin, queueing the rest in FIFO order
//! 3. Workers mesh the chunk and send the finished `ChunkMesh` back
//! 4. Results are collected with `process_completed_tasks()` or `drain()`
//!
//! ## Example Usage
//! ```rust
//! use std::sync::Arc;
//! use cgmath::Point3;
//! use voxel_mesher::core::MtResource;
//! use voxel_mesher::engine_state::rendering::texture::TextureArray;
//! use voxel_mesher::engine_state::task_management::{
//!     task::{ChunkMeshTask, WorkerContext},
//!     MeshWorkerPool,
//! };
//! use voxel_mesher::engine_state::voxels::{
//!     block::registry::BlockRegistry, chunk::Chunk, visibility::ExtendedChunkData,
//! };
//!
//! let registry = Arc::new(BlockRegistry::default());
//! let textures = MtResource::new(TextureArray::from_registry(&registry));
//! let mut pool = MeshWorkerPool::new(2, WorkerContext::new(registry, textures));
//!
//! let chunk = Chunk::solid(&Point3::new(0, 0, 0));
//! pool.publish_task(ChunkMeshTask::new(ExtendedChunkData::from_chunks(&chunk, [None; 6])));
//!
//! let meshes = pool.drain();
//! assert_eq!(meshes.len(), 1);
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use cgmath::Point3;

use log::{debug, error, info, warn};

use crate::engine_state::rendering::meshing::ChunkMesh;
use task::{ChunkMeshTask, WorkerContext};

/// A communication channel between the owning thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks to the worker
/// - `result_receiver`: Receives finished meshes from the worker
/// - `tasks_in_flight`: Chunk positions sent and not yet received back, oldest first
/// - `alive`: Cleared once either end of the channel disconnects
/// - `_worker`: Handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<ChunkMeshTask>,
    result_receiver: Receiver<ChunkMesh>,
    tasks_in_flight: VecDeque<Point3<i32>>,
    alive: bool,
    _worker: JoinHandle<()>,
}

impl TaskChannel {
    fn spawn(context: &WorkerContext) -> Self {
        let (task_tx, task_rx) = channel::<ChunkMeshTask>();
        let (result_tx, result_rx) = channel::<ChunkMesh>();
        let mut context = context.clone();

        let worker = thread::spawn(move || {
            while let Ok(task) = task_rx.recv() {
                let mesh = task.process(&mut context);
                if result_tx.send(mesh).is_err() {
                    break;
                }
            }
        });

        TaskChannel {
            task_sender: task_tx,
            result_receiver: result_rx,
            tasks_in_flight: VecDeque::new(),
            alive: true,
            _worker: worker,
        }
    }

    fn accepts_tasks(&self) -> bool {
        self.alive && self.tasks_in_flight.len() < MAX_TASKS_IN_FLIGHT
    }
}

/// Manages a pool of mesh worker threads.
///
/// Dropping the pool closes every task channel, which ends the workers once they
/// finish their current task.
///
/// A worker that disconnects is never used again. Tasks it held, and queued tasks no
/// live worker can take, are reported by [`MeshWorkerPool::take_dropped_tasks`].
pub struct MeshWorkerPool {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<ChunkMeshTask>,
    dropped_tasks: Vec<Point3<i32>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl MeshWorkerPool {
    /// Creates a pool with `num_workers` threads, at least one.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads
    /// * `context` - Registry and texture table cloned into every worker
    pub fn new(num_workers: usize, context: WorkerContext) -> Self {
        let num_workers = if num_workers == 0 {
            warn!("Mesh worker pool needs at least one worker, using 1");
            1
        } else {
            num_workers
        };

        info!(
            "Starting {} mesh workers, available parallelism: {:?}",
            num_workers,
            thread::available_parallelism()
        );

        let channels = (0..num_workers).map(|_| TaskChannel::spawn(&context)).collect();

        MeshWorkerPool {
            channels,
            queued_tasks: VecDeque::new(),
            dropped_tasks: Vec::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads, live or not.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of workers still accepting tasks.
    pub fn live_worker_count(&self) -> usize {
        self.channels.iter().filter(|channel| channel.alive).count()
    }

    /// Tasks waiting for an idle worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Tasks handed to workers and not yet collected.
    pub fn in_flight_count(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.tasks_in_flight.len())
            .sum()
    }

    /// True if nothing is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.in_flight_count() == 0
    }

    /// Chunk positions of tasks lost to disconnected workers since the last call.
    pub fn take_dropped_tasks(&mut self) -> Vec<Point3<i32>> {
        std::mem::take(&mut self.dropped_tasks)
    }

    /// Stops using a worker and records the tasks it still held as dropped.
    fn retire_channel(&mut self, channel_idx: usize) {
        let channel = &mut self.channels[channel_idx];
        if channel.alive {
            error!(
                "Mesh worker {} disconnected with {} tasks in flight",
                channel_idx,
                channel.tasks_in_flight.len()
            );
        }
        channel.alive = false;
        self.dropped_tasks.extend(channel.tasks_in_flight.drain(..));
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent
    /// - `Err(task)` if the worker has disconnected
    fn try_send_task(
        &mut self,
        task: ChunkMeshTask,
        channel_idx: usize,
    ) -> Result<(), ChunkMeshTask> {
        let position = task.position();
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.tasks_in_flight.push_back(position);
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds a live worker channel below `MAX_TASKS_IN_FLIGHT`, round-robin from the
    /// last used channel.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&index| self.channels[index].accepts_tasks())
    }

    /// Publishes a new task for execution.
    ///
    /// Tasks already waiting go first, so tasks start in publish order.
    ///
    /// # Returns
    /// - `true` if the task was handed to a worker immediately
    /// - `false` if it was queued because all workers are busy, or dropped because
    ///   none is left
    pub fn publish_task(&mut self, task: ChunkMeshTask) -> bool {
        self.queued_tasks.push_back(task);
        self.process_queued_tasks();
        let scheduled = self.queued_tasks.is_empty() && self.live_worker_count() > 0;
        if !self.queued_tasks.is_empty() {
            debug!("Mesh task queued, {} waiting", self.queued_tasks.len());
        }
        scheduled
    }

    /// Hands queued tasks to idle workers, oldest first, until the queue is empty or
    /// every worker is busy. With no live worker left the queue is dropped.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                }
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    self.retire_channel(channel_idx);
                }
            }
        }

        if self.live_worker_count() == 0 && !self.queued_tasks.is_empty() {
            error!(
                "No mesh worker left, dropping {} queued tasks",
                self.queued_tasks.len()
            );
            let dropped = self.queued_tasks.drain(..).map(|task| task.position());
            self.dropped_tasks.extend(dropped);
        }
    }

    /// Collects every finished mesh without blocking, then refills idle workers from
    /// the queue.
    pub fn process_completed_tasks(&mut self) -> Vec<ChunkMesh> {
        let mut meshes = Vec::new();
        for channel_idx in 0..self.channels.len() {
            loop {
                let channel = &mut self.channels[channel_idx];
                if !channel.alive {
                    break;
                }
                match channel.result_receiver.try_recv() {
                    Ok(mesh) => {
                        channel.tasks_in_flight.pop_front();
                        meshes.push(mesh);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.retire_channel(channel_idx);
                        break;
                    }
                }
            }
        }
        self.process_queued_tasks();
        meshes
    }

    /// Blocks until every published task has finished or been dropped.
    ///
    /// # Returns
    /// All meshes not collected before.
    pub fn drain(&mut self) -> Vec<ChunkMesh> {
        let mut meshes = Vec::new();
        loop {
            meshes.extend(self.process_completed_tasks());
            if self.is_idle() {
                break;
            }

            let Some(channel_idx) = self
                .channels
                .iter()
                .position(|channel| channel.alive && !channel.tasks_in_flight.is_empty())
            else {
                break;
            };
            let channel = &mut self.channels[channel_idx];
            match channel.result_receiver.recv() {
                Ok(mesh) => {
                    channel.tasks_in_flight.pop_front();
                    meshes.push(mesh);
                }
                Err(_) => self.retire_channel(channel_idx),
            }
        }
        meshes
    }

    /// Replaces a worker with one whose channels are already closed.
    #[cfg(test)]
    pub(crate) fn disconnect_worker(&mut self, channel_idx: usize) {
        let (task_sender, _) = channel::<ChunkMeshTask>();
        let (_, result_receiver) = channel::<ChunkMesh>();
        self.channels[channel_idx] = TaskChannel {
            task_sender,
            result_receiver,
            tasks_in_flight: VecDeque::new(),
            alive: true,
            _worker: thread::spawn(|| {}),
        };
    }
}
