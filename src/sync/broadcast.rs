//! Append-only broadcast log with per-consumer cursors

use super::WaitStrategy;
use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a consumer, doubling as its producer tag when it publishes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(usize);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A published entry: immutable once appended
#[derive(Clone, Debug)]
pub(crate) struct Message<M> {
    payload: M,
    producer: ConsumerId,
}

/// Read cursor owned by exactly one consumer
///
/// Not `Clone`: two holders of the same cursor would consume each other's
/// messages.
#[derive(Debug)]
pub struct Consumer {
    id: ConsumerId,
    queue: u64,
    position: usize,
}

impl Consumer {
    /// This consumer's identity
    #[inline]
    pub fn id(&self) -> ConsumerId {
        self.id
    }

    /// Index of the next log entry this consumer will inspect
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Single-log, many-cursor broadcast queue
///
/// Publishing appends under an exclusive lock and never waits on readers.
/// Receiving takes a shared lock and only moves the caller's own cursor.
pub struct BroadcastQueue<M> {
    id: u64,
    log: RwLock<Vec<Message<M>>>,
    next_consumer: AtomicUsize,
    aborted: AtomicBool,
    signal: Mutex<()>,
    published: Condvar,
}

impl<M> BroadcastQueue<M> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            id: NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed),
            log: RwLock::new(Vec::new()),
            next_consumer: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
            signal: Mutex::new(()),
            published: Condvar::new(),
        }
    }

    /// Register a new consumer
    ///
    /// The cursor starts at the head of the log, so messages published before
    /// the consumer existed are still delivered to it.
    pub fn create_consumer(&self) -> Consumer {
        let id = ConsumerId(self.next_consumer.fetch_add(1, Ordering::Relaxed));
        Consumer {
            id,
            queue: self.id,
            position: 0,
        }
    }

    /// Append `payload` tagged with `producer`
    pub fn publish(&self, payload: M, producer: ConsumerId) {
        let position = {
            let mut log = self.log.write();
            log.push(Message { payload, producer });
            log.len() - 1
        };
        log::trace!("queue {}: {} published entry {}", self.id, producer, position);
        self.notify_all();
    }

    /// Whether `consumer` has an observable message
    ///
    /// Skips the cursor past entries the consumer produced itself.
    pub fn has_next(&self, consumer: &mut Consumer) -> bool {
        let log = self.log.read();
        self.advance(&log, consumer)
    }

    /// Number of entries ever published
    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    /// Whether nothing has been published yet
    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }

    /// Mark the queue as torn down and wake every parked consumer
    ///
    /// Already-published messages stay receivable; waits for anything further
    /// fail with `PipelineAborted`.
    pub fn abort(&self) {
        if !self.aborted.swap(true, Ordering::AcqRel) {
            log::warn!("queue {}: aborted", self.id);
        }
        self.notify_all();
    }

    /// Whether [`abort`](Self::abort) has been called
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    fn advance(&self, log: &[Message<M>], consumer: &mut Consumer) -> bool {
        debug_assert_eq!(
            consumer.queue, self.id,
            "consumer {} used on a queue that did not create it",
            consumer.id
        );
        while consumer.position < log.len() && log[consumer.position].producer == consumer.id {
            consumer.position += 1;
        }
        consumer.position < log.len()
    }

    fn notify_all(&self) {
        let _guard = self.signal.lock();
        self.published.notify_all();
    }
}

impl<M: Clone> BroadcastQueue<M> {
    /// Take the next observable message, if any
    pub fn try_receive(&self, consumer: &mut Consumer) -> Option<M> {
        let log = self.log.read();
        if !self.advance(&log, consumer) {
            return None;
        }
        let payload = log[consumer.position].payload.clone();
        consumer.position += 1;
        Some(payload)
    }

    /// Take the next observable message
    ///
    /// Fails with `EmptyQueue` when [`has_next`](Self::has_next) would be false.
    pub fn receive(&self, consumer: &mut Consumer) -> Result<M> {
        self.try_receive(consumer).ok_or(Error::EmptyQueue {
            consumer: consumer.id,
        })
    }

    /// Take the next observable message, waiting for it to be published
    ///
    /// Gives up with `PipelineStalled` once `timeout` has elapsed, or with
    /// `PipelineAborted` if the queue is aborted while waiting. `None` waits
    /// forever.
    pub fn receive_wait(
        &self,
        consumer: &mut Consumer,
        wait: WaitStrategy,
        timeout: Option<Duration>,
    ) -> Result<M> {
        let start = Instant::now();
        loop {
            if let Some(payload) = self.try_receive(consumer) {
                return Ok(payload);
            }
            if self.is_aborted() {
                return Err(Error::PipelineAborted);
            }

            let waited = start.elapsed();
            let remaining = match timeout {
                Some(limit) if waited >= limit => {
                    log::warn!(
                        "queue {}: consumer {} stalled after {:?} at entry {}",
                        self.id,
                        consumer.id,
                        waited,
                        consumer.position
                    );
                    return Err(Error::PipelineStalled {
                        consumer: consumer.id,
                        waited,
                    });
                }
                Some(limit) => Some(limit - waited),
                None => None,
            };

            match wait {
                WaitStrategy::Poll { interval } => {
                    thread::sleep(remaining.map_or(interval, |r| r.min(interval)));
                }
                WaitStrategy::Park => {
                    let mut guard = self.signal.lock();
                    // Re-check under the signal lock so a publish between the
                    // check above and this wait cannot be missed.
                    if self.has_next(consumer) || self.is_aborted() {
                        continue;
                    }
                    match remaining {
                        Some(r) => {
                            self.published.wait_for(&mut guard, r);
                        }
                        None => self.published.wait(&mut guard),
                    }
                }
            }
        }
    }
}

impl<M> Default for BroadcastQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for BroadcastQueue<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastQueue")
            .field("id", &self.id)
            .field("len", &self.len())
            .field("aborted", &self.is_aborted())
            .finish_non_exhaustive()
    }
}
