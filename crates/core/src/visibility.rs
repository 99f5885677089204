//! Publication gate for videos.
//!
//! A video is visible once its `published_at` has been reached and scheduled
//! before that. The state is never stored: every read path recomputes it from
//! the timestamp and the caller's notion of "now", so a scheduled video goes
//! live without any write.

use serde::Serialize;

use crate::types::Timestamp;

/// `published_at <= now`.
pub fn is_visible(published_at: Timestamp, now: Timestamp) -> bool {
    published_at <= now
}

/// `published_at > now`. Always the negation of [`is_visible`].
pub fn is_scheduled(published_at: Timestamp, now: Timestamp) -> bool {
    !is_visible(published_at, now)
}

/// The two publication states a video can be in at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Scheduled,
}

impl Visibility {
    pub fn at(published_at: Timestamp, now: Timestamp) -> Self {
        if is_visible(published_at, now) {
            Self::Visible
        } else {
            Self::Scheduled
        }
    }
}

/// Anything carrying a publication timestamp.
pub trait Publishable {
    fn published_at(&self) -> Timestamp;

    fn visibility(&self, now: Timestamp) -> Visibility {
        Visibility::at(self.published_at(), now)
    }

    fn is_visible(&self, now: Timestamp) -> bool {
        is_visible(self.published_at(), now)
    }

    fn is_scheduled(&self, now: Timestamp) -> bool {
        is_scheduled(self.published_at(), now)
    }
}

/// Who is reading.
///
/// Public readers only ever see visible videos; the admin collaborator sees
/// scheduled ones too. Repositories bind [`Audience::cutoff`] into a single
/// shared SQL predicate rather than branching per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public { now: Timestamp },
    Admin,
}

impl Audience {
    pub fn public(now: Timestamp) -> Self {
        Self::Public { now }
    }

    /// Upper bound on `published_at` for this reader, `None` for no bound.
    pub fn cutoff(&self) -> Option<Timestamp> {
        match self {
            Self::Public { now } => Some(*now),
            Self::Admin => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for read paths.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
