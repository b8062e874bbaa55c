// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Periodic cursor synchronization.
//!
//! The loop is a chain of one-shot ticks that re-arm themselves while
//! playback is active. Every chain carries the generation it was started
//! with; starting or cancelling bumps the generation, so a tick from a
//! superseded chain is dropped instead of re-arming.

use std::time::{Duration, Instant};

pub const DEFAULT_SYNC_PERIOD: Duration = Duration::from_millis(50);

/// A scheduled tick of one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTicket {
    pub generation: u64,
    pub due: Instant,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncStep {
    /// Nothing was due.
    Idle,
    /// Cursor moved to this position and the chain re-armed.
    Advanced(f64),
    /// Playback ended: cursor removed, chain terminated.
    Finished,
}

#[derive(Debug)]
pub struct PlaybackSyncLoop {
    period: Duration,
    generation: u64,
    pending: Option<SyncTicket>,
}

impl Default for PlaybackSyncLoop {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_PERIOD)
    }
}

impl PlaybackSyncLoop {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            pending: None,
        }
    }

    /// Start a fresh chain with its first tick due immediately,
    /// superseding any pending one.
    pub fn start(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.pending = Some(SyncTicket {
            generation: self.generation,
            due: now,
        });
        log::debug!("Cursor sync chain {} started", self.generation);
        self.generation
    }

    /// Invalidate the running chain without a final step.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.map(|ticket| ticket.due)
    }

    /// Take the pending tick if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<SyncTicket> {
        match self.pending {
            Some(ticket) if ticket.due <= now => self.pending.take(),
            _ => None,
        }
    }

    /// Schedule the next tick of `ticket`'s chain one period after `now`.
    /// Returns false when the chain has been superseded.
    pub fn rearm(&mut self, ticket: SyncTicket, now: Instant) -> bool {
        if ticket.generation != self.generation {
            log::debug!("Dropping stale tick of chain {}", ticket.generation);
            return false;
        }
        self.pending = Some(SyncTicket {
            generation: ticket.generation,
            due: now + self.period,
        });
        true
    }

    pub fn is_current(&self, ticket: &SyncTicket) -> bool {
        ticket.generation == self.generation
    }
}
