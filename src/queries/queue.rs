//! FIFO queue of calls waiting for a fresh fix.

use crate::types::{LocationSample, QueryKind, QueryReply, Timestamp};
use std::collections::VecDeque;

/// A call whose reply is withheld until the next fix.
#[derive(Debug)]
pub struct PendingQuery<C> {
    pub kind: QueryKind,
    /// Transport handle used to complete the call later.
    pub call: C,
    pub enqueued_at: Timestamp,
}

impl<C> PendingQuery<C> {
    pub fn new(kind: QueryKind, call: C, enqueued_at: Timestamp) -> Self {
        Self {
            kind,
            call,
            enqueued_at,
        }
    }
}

/// Pending queries in arrival order.
#[derive(Debug)]
pub struct PendingQueryQueue<C> {
    queries: VecDeque<PendingQuery<C>>,
}

impl<C> PendingQueryQueue<C> {
    pub fn new() -> Self {
        Self {
            queries: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, query: PendingQuery<C>) {
        self.queries.push_back(query);
    }

    /// Remove every pending query and pair it with its reply computed from
    /// `sample`.
    pub fn drain(&mut self, sample: &LocationSample) -> Vec<(PendingQuery<C>, QueryReply)> {
        self.queries
            .drain(..)
            .map(|query| {
                let reply = sample.reply_for(query.kind);
                (query, reply)
            })
            .collect()
    }

    /// Drop every pending query without answering.
    pub fn clear(&mut self) -> usize {
        let count = self.queries.len();
        self.queries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Age of the oldest pending query at `now`.
    pub fn oldest_age(&self, now: Timestamp) -> Option<i64> {
        self.queries
            .front()
            .and_then(|query| query.enqueued_at.age_at(now))
    }
}

impl<C> Default for PendingQueryQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PositionFields, VelocityFields};

    #[test]
    fn test_drain_fifo_same_sample() {
        let mut queue = PendingQueryQueue::new();
        queue.enqueue(PendingQuery::new(QueryKind::Position, 1u32, Timestamp(0)));
        queue.enqueue(PendingQuery::new(QueryKind::Velocity, 2u32, Timestamp(1)));
        queue.enqueue(PendingQuery::new(QueryKind::Position, 3u32, Timestamp(2)));
        assert_eq!(queue.len(), 3);

        let sample = LocationSample::at(Timestamp(50))
            .with_coordinates(1.0, 2.0)
            .with_speed(4.0);
        let drained = queue.drain(&sample);

        assert!(queue.is_empty());
        let calls: Vec<u32> = drained.iter().map(|(q, _)| q.call).collect();
        assert_eq!(calls, vec![1, 2, 3]);

        for (query, reply) in &drained {
            assert_eq!(reply.kind(), query.kind);
            match reply {
                QueryReply::Position(p) => {
                    assert_eq!(p.timestamp, Timestamp(50));
                    assert_eq!(p.fields, PositionFields::LATITUDE | PositionFields::LONGITUDE);
                }
                QueryReply::Velocity(v) => {
                    assert_eq!(v.timestamp, Timestamp(50));
                    assert_eq!(v.fields, VelocityFields::SPEED);
                }
            }
        }
    }

    #[test]
    fn test_drain_empty() {
        let mut queue: PendingQueryQueue<()> = PendingQueryQueue::new();
        assert!(queue.drain(&LocationSample::empty()).is_empty());
    }

    #[test]
    fn test_oldest_age_and_clear() {
        let mut queue = PendingQueryQueue::new();
        assert_eq!(queue.oldest_age(Timestamp(10)), None);

        queue.enqueue(PendingQuery::new(QueryKind::Position, (), Timestamp(4)));
        queue.enqueue(PendingQuery::new(QueryKind::Position, (), Timestamp(8)));
        assert_eq!(queue.oldest_age(Timestamp(10)), Some(6));

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }
}
