//! Room model load state machine with bounded exponential backoff.
//!
//! The machine never performs I/O itself. Every transition that needs a load
//! returns a [`LoadTicket`]; the host starts the load and later feeds the
//! result back through [`AssetLoadController::complete`]. Tickets carry a
//! request id, so a result that arrives after the user moved on is recognised
//! and dropped.

use std::time::{Duration, Instant};

use roomviz_config::RetryConfig;
use roomviz_ipc::{LoadStatus, RoomType};
use tracing::{info, warn};

use crate::error::{AssetLoadError, StagingError};

/// Identifies one issued load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub room: RoomType,
    pub request_id: u64,
    /// 0 for the first try, 1..=max_retries for retries
    pub attempt: u32,
}

/// Bookkeeping for the room currently being loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAttempt {
    pub room: RoomType,
    pub attempt_count: u32,
    pub last_error: Option<AssetLoadError>,
    pub backoff_deadline: Option<Instant>,
}

impl LoadAttempt {
    fn new(room: RoomType) -> Self {
        Self {
            room,
            attempt_count: 0,
            last_error: None,
            backoff_deadline: None,
        }
    }
}

/// Where the active room's load stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No room requested yet
    Idle,
    /// A request is in flight
    Loading { ticket: LoadTicket },
    /// The room's scene was delivered
    Ready { room: RoomType },
    /// Waiting for the retry deadline
    Backoff { room: RoomType, retry_at: Instant, delay: Duration },
    /// Retries used up; only a different room leaves this state
    Exhausted { room: RoomType },
}

/// What a delivered load result did to the machine.
#[derive(Debug)]
pub enum Completion<S> {
    /// The result belongs to the current request and succeeded
    Ready(S),
    /// The current request failed; another attempt follows after `delay`
    RetryScheduled { retry_at: Instant, delay: Duration },
    /// The current request failed and no retries remain
    Exhausted(StagingError),
    /// The result belongs to a superseded request and was dropped
    Stale,
}

/// Drives model loading for whichever room is currently selected.
#[derive(Debug)]
pub struct AssetLoadController {
    retry: RetryConfig,
    state: LoadState,
    attempt: Option<LoadAttempt>,
    next_request_id: u64,
}

impl AssetLoadController {
    pub fn new(retry: RetryConfig) -> Self {
        Self {
            retry,
            state: LoadState::Idle,
            attempt: None,
            next_request_id: 0,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn attempt(&self) -> Option<&LoadAttempt> {
        self.attempt.as_ref()
    }

    /// Room whose scene is wanted, whatever the load state
    pub fn room(&self) -> Option<RoomType> {
        self.attempt.as_ref().map(|attempt| attempt.room)
    }

    /// The user picked a room.
    ///
    /// A different room (or any room while idle) abandons whatever was
    /// pending and starts a fresh first attempt. Re-selecting the current
    /// room changes nothing, including an exhausted one.
    pub fn select_room(&mut self, room: RoomType) -> Option<LoadTicket> {
        if self.state != LoadState::Idle && self.room() == Some(room) {
            return None;
        }

        match self.state {
            LoadState::Loading { ticket } => {
                info!(
                    "Abandoning {} load (request {}) for {}",
                    ticket.room, ticket.request_id, room
                );
            }
            LoadState::Backoff { room: pending, .. } => {
                info!("Cancelling pending {} retry for {}", pending, room);
            }
            _ => {}
        }

        self.attempt = Some(LoadAttempt::new(room));
        Some(self.issue(room, 0))
    }

    /// Deliver the result of the request identified by `ticket`.
    pub fn complete<S>(
        &mut self,
        ticket: LoadTicket,
        result: Result<S, AssetLoadError>,
        now: Instant,
    ) -> Completion<S> {
        let current = match self.state {
            LoadState::Loading { ticket: current } => current,
            _ => return self.stale(ticket),
        };
        if current != ticket {
            return self.stale(ticket);
        }

        match result {
            Ok(scene) => {
                info!("Loaded {} (attempt {})", ticket.room, ticket.attempt);
                self.state = LoadState::Ready { room: ticket.room };
                if let Some(attempt) = self.attempt.as_mut() {
                    attempt.last_error = None;
                    attempt.backoff_deadline = None;
                }
                Completion::Ready(scene)
            }
            Err(error) => self.fail(ticket.room, error, now),
        }
    }

    /// Issue the retry once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<LoadTicket> {
        let LoadState::Backoff { room, retry_at, .. } = self.state else {
            return None;
        };
        if now < retry_at {
            return None;
        }

        let attempt = self.attempt.as_mut()?;
        attempt.attempt_count += 1;
        attempt.backoff_deadline = None;
        let count = attempt.attempt_count;
        info!("Retrying {} (retry {} of {})", room, count, self.retry.max_retries);
        Some(self.issue(room, count))
    }

    /// Status for display
    pub fn status(&self) -> LoadStatus {
        let error = || {
            self.attempt
                .as_ref()
                .and_then(|attempt| attempt.last_error.as_ref())
                .map(ToString::to_string)
                .unwrap_or_default()
        };
        match self.state {
            LoadState::Idle => LoadStatus::Idle,
            LoadState::Loading { ticket } => LoadStatus::Loading {
                room: ticket.room,
                attempt: ticket.attempt,
            },
            LoadState::Ready { room } => LoadStatus::Ready { room },
            LoadState::Backoff { room, delay, .. } => LoadStatus::RetryScheduled {
                room,
                attempt: self.attempt.as_ref().map_or(0, |a| a.attempt_count),
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error: error(),
            },
            LoadState::Exhausted { room } => LoadStatus::Exhausted {
                room,
                error: error(),
            },
        }
    }

    fn issue(&mut self, room: RoomType, attempt: u32) -> LoadTicket {
        self.next_request_id += 1;
        let ticket = LoadTicket {
            room,
            request_id: self.next_request_id,
            attempt,
        };
        self.state = LoadState::Loading { ticket };
        ticket
    }

    fn fail<S>(&mut self, room: RoomType, error: AssetLoadError, now: Instant) -> Completion<S> {
        let attempt = self.attempt.get_or_insert_with(|| LoadAttempt::new(room));
        attempt.last_error = Some(error.clone());

        let count = attempt.attempt_count;
        let retry = (count < self.retry.max_retries)
            .then(|| self.retry.backoff(count))
            .and_then(|delay| Some((now.checked_add(delay)?, delay)));

        // A deadline past the clock's range counts as out of retries
        if let Some((retry_at, delay)) = retry {
            attempt.backoff_deadline = Some(retry_at);
            warn!(
                "Loading {} failed: {}; retrying in {}ms",
                room,
                error,
                delay.as_millis()
            );
            self.state = LoadState::Backoff {
                room,
                retry_at,
                delay,
            };
            Completion::RetryScheduled { retry_at, delay }
        } else {
            attempt.backoff_deadline = None;
            warn!(
                "Loading {} failed after {} retries: {}",
                room, attempt.attempt_count, error
            );
            self.state = LoadState::Exhausted { room };
            Completion::Exhausted(StagingError::AssetLoadFailure {
                room,
                source: error,
            })
        }
    }

    fn stale<S>(&self, ticket: LoadTicket) -> Completion<S> {
        info!(
            "Dropping stale {} result (request {})",
            ticket.room, ticket.request_id
        );
        Completion::Stale
    }
}
