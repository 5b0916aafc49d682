//! Queue of deterministic theta events scheduled at fixed simulation times.

use serde_json::Value;

use crate::event::Payload;
use crate::observer::ObserverId;

struct ThetaBucket {
    time: f64,
    observer: ObserverId,
    payloads: Vec<Box<dyn Payload>>,
    // Serialized form of each payload, used to collapse duplicates.
    keys: Vec<Option<Value>>,
}

impl ThetaBucket {
    fn insert(&mut self, payload: Box<dyn Payload>) {
        let key = serde_json::to_value(&*payload).ok();
        if key.is_some() && self.keys.contains(&key) {
            return;
        }
        self.keys.push(key);
        self.payloads.push(payload);
    }
}

/// Theta events that became due at the same time, grouped by observer.
pub struct ThetaBatch {
    /// Time the events were scheduled at.
    pub time: f64,
    /// Payloads per observer, in the order the observers first registered for this time.
    pub entries: Vec<(ObserverId, Vec<Box<dyn Payload>>)>,
}

impl ThetaBatch {
    /// Returns `true` if the batch holds no events.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table of (time, observer) buckets holding theta event payloads.
///
/// The queue tracks the time of the next due bucket: the smallest registered time when simulating forward, the
/// largest one in reverse time, and `+inf` / `-inf` respectively when the queue is empty. This time is recomputed by
/// a full scan of the remaining buckets after every removal.
pub struct ThetaEventQueue {
    reverse_time: bool,
    buckets: Vec<ThetaBucket>,
    next_event_time: f64,
}

impl ThetaEventQueue {
    /// Creates an empty queue for the given time direction.
    pub fn new(reverse_time: bool) -> Self {
        Self {
            reverse_time,
            buckets: Vec::new(),
            next_event_time: Self::empty_time(reverse_time),
        }
    }

    fn empty_time(reverse_time: bool) -> f64 {
        if reverse_time {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    }

    /// Adds the payload to the bucket of `(time, observer)`, creating the bucket if needed.
    ///
    /// Payloads with equal serialized values collapse into one within a bucket. A NaN time can never become due, so
    /// such events are dropped.
    pub fn push_theta(&mut self, time: f64, observer: ObserverId, payload: Box<dyn Payload>) {
        if time.is_nan() {
            return;
        }
        match self
            .buckets
            .iter_mut()
            .find(|b| b.time.to_bits() == time.to_bits() && b.observer == observer)
        {
            Some(bucket) => bucket.insert(payload),
            None => {
                let mut bucket = ThetaBucket {
                    time,
                    observer,
                    payloads: Vec::new(),
                    keys: Vec::new(),
                };
                bucket.insert(payload);
                self.buckets.push(bucket);
            }
        }
        self.next_event_time = if self.reverse_time {
            self.next_event_time.max(time)
        } else {
            self.next_event_time.min(time)
        };
    }

    /// Removes and returns all buckets filed under the next event time.
    pub fn next_event_data_and_remove(&mut self) -> ThetaBatch {
        let time = self.next_event_time;
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.buckets)
            .into_iter()
            .partition(|b| b.time.to_bits() == time.to_bits());
        self.buckets = rest;
        self.next_event_time = self.scan_next_event_time();
        ThetaBatch {
            time,
            entries: due.into_iter().map(|b| (b.observer, b.payloads)).collect(),
        }
    }

    fn scan_next_event_time(&self) -> f64 {
        let times = self.buckets.iter().map(|b| b.time);
        if self.reverse_time {
            times.fold(f64::NEG_INFINITY, f64::max)
        } else {
            times.fold(f64::INFINITY, f64::min)
        }
    }

    /// Returns the time of the next due bucket.
    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    /// Returns `true` if the simulation runs backwards in time.
    pub fn is_reverse_time(&self) -> bool {
        self.reverse_time
    }

    /// Returns the number of (time, observer) buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if no theta events are pending.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
