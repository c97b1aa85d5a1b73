//! Worker spawning, joining and draining for block pipelines
//!
//! A pipeline invocation owns one [`BroadcastQueue`]. The coordinator
//! registers its own consumer first, spawns one scoped OS thread per block,
//! joins them all, and only then drains the finalized messages in the order
//! the algorithm requires.
//!
//! ```text
//!            publish ┌───────────────┐ publish
//!  block p-1 ───────►│ BroadcastQueue│◄─────── block 0
//!      ▲             └───────┬───────┘             ▲
//!      └──── recv ───────────┼─────────── recv ────┘
//!                            ▼ drain (after join)
//!                       coordinator
//! ```
//!
//! When a worker fails or panics it aborts the queue, so siblings waiting on
//! it return `PipelineAborted` instead of spinning until their stall bound.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::sync::{BroadcastQueue, Consumer, ConsumerId, WaitStrategy};
use std::any::Any;
use std::thread;
use std::time::Duration;

/// One block's share of a pipelined algorithm
pub trait BlockWorker: Send {
    /// Finalized unit exchanged between blocks
    type Message: Clone + Send + Sync;

    /// Index of the block this worker owns
    fn block(&self) -> usize;

    /// Consume dependencies, compute, and publish this block's contribution
    fn run(self, link: &mut BlockLink<'_, Self::Message>) -> Result<()>;
}

/// A worker's connection to the pipeline queue
pub struct BlockLink<'q, M> {
    queue: &'q BroadcastQueue<M>,
    consumer: Consumer,
    wait: WaitStrategy,
    stall_timeout: Option<Duration>,
}

impl<'q, M: Clone> BlockLink<'q, M> {
    /// Connect a fresh consumer on `queue`
    pub fn new(queue: &'q BroadcastQueue<M>, config: &PipelineConfig) -> Self {
        Self {
            queue,
            consumer: queue.create_consumer(),
            wait: config.wait_strategy(),
            stall_timeout: config.stall_timeout(),
        }
    }

    /// This worker's consumer/producer identity
    pub fn id(&self) -> ConsumerId {
        self.consumer.id()
    }

    /// Wait for the next message published by another block
    pub fn recv(&mut self) -> Result<M> {
        self.queue
            .receive_wait(&mut self.consumer, self.wait, self.stall_timeout)
    }

    /// Publish a finalized unit to every other block and the coordinator
    pub fn publish(&self, message: M) {
        self.queue.publish(message, self.consumer.id());
    }
}

/// Spawns, joins and drains one pipeline invocation
pub struct PipelineCoordinator<'q, M> {
    queue: &'q BroadcastQueue<M>,
    consumer: Consumer,
    config: PipelineConfig,
}

impl<'q, M: Clone + Send + Sync> PipelineCoordinator<'q, M> {
    /// Register the coordinator's consumer on `queue`
    pub fn new(queue: &'q BroadcastQueue<M>, config: PipelineConfig) -> Self {
        Self {
            queue,
            consumer: queue.create_consumer(),
            config,
        }
    }

    /// Run every worker on its own thread and wait for all of them
    ///
    /// Returns the first error that was not merely a reaction to another
    /// worker aborting the pipeline.
    pub fn run<W>(&self, workers: Vec<W>) -> Result<()>
    where
        W: BlockWorker<Message = M>,
    {
        let queue = self.queue;
        let outcomes: Vec<(usize, Result<()>)> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(workers.len());
            for worker in workers {
                let block = worker.block();
                let mut link = BlockLink::new(queue, &self.config);
                let spawned = thread::Builder::new()
                    .name(format!("blockpipe-{}", block))
                    .spawn_scoped(s, move || {
                        let _guard = AbortOnUnwind(queue);
                        let result = worker.run(&mut link);
                        if let Err(e) = &result {
                            if !e.is_secondary() {
                                log::warn!("block {} failed: {}", block, e);
                            }
                            queue.abort();
                        }
                        result
                    });
                if spawned.is_err() {
                    queue.abort();
                }
                handles.push((block, spawned));
            }

            handles
                .into_iter()
                .map(|(block, spawned)| {
                    let outcome = match spawned {
                        Ok(handle) => handle.join().unwrap_or_else(|payload| {
                            Err(Error::WorkerPanicked {
                                block,
                                message: panic_message(payload.as_ref()),
                            })
                        }),
                        Err(e) => Err(Error::Internal(format!(
                            "failed to spawn worker for block {}: {}",
                            block, e
                        ))),
                    };
                    (block, outcome)
                })
                .collect()
        });

        let mut secondary = None;
        for (block, outcome) in outcomes {
            match outcome {
                Ok(()) => {}
                Err(e) if e.is_secondary() => {
                    log::debug!("block {} stopped after pipeline abort", block);
                    secondary.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        secondary.map_or(Ok(()), Err)
    }

    /// Hand exactly `expected` messages to `sink`, in publish order
    ///
    /// Never waits: all producers have been joined. Seeing fewer than
    /// `expected` messages fails with `PipelineExhausted`.
    pub fn drain<F>(&mut self, expected: usize, mut sink: F) -> Result<()>
    where
        F: FnMut(usize, M) -> Result<()>,
    {
        for received in 0..expected {
            match self.queue.try_receive(&mut self.consumer) {
                Some(message) => sink(received, message)?,
                None => {
                    log::warn!(
                        "pipeline exhausted after {} of {} messages",
                        received,
                        expected
                    );
                    return Err(Error::PipelineExhausted { expected, received });
                }
            }
        }
        Ok(())
    }
}

/// Aborts the queue if the owning worker thread unwinds
struct AbortOnUnwind<'q, M>(&'q BroadcastQueue<M>);

impl<M> Drop for AbortOnUnwind<'_, M> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
