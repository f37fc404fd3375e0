//! Presentation capability
//!
//! The rules engine never renders anything. It tells a [`Presenter`] what
//! happened to each piece and awaits the returned [`Animation`]s where the
//! game flow needs them finished (swaps, pops, falls). A renderer implements
//! this trait; headless runs use [`HeadlessPresenter`] or [`DelayPresenter`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};

use crate::types::{Piece, PieceId, TypeCode, ViewPoint};

/// A running animation. Completes when the animation finishes.
pub type Animation = BoxFuture<'static, ()>;

/// An animation that is already finished
pub fn instant() -> Animation {
    future::ready(()).boxed()
}

pub trait Presenter: Send {
    /// A piece was created; `at` is where it starts (may be above the board)
    fn spawn(&mut self, piece: &Piece, at: ViewPoint);

    /// Player-driven movement (swap and swap-back)
    fn slide(&mut self, id: PieceId, to: ViewPoint) -> Animation;

    /// Gravity and refill movement
    fn fall(&mut self, id: PieceId, to: ViewPoint) -> Animation;

    /// Removal animation; the piece is disposed once it completes
    fn pop(&mut self, id: PieceId) -> Animation;

    /// The piece is gone and its id may be reused
    fn dispose(&mut self, id: PieceId);

    /// Board-wide input gate
    fn set_interactive(&mut self, _interactive: bool) {}
}

/// One call received by a [`HeadlessPresenter`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresenterCall {
    Spawn {
        id: PieceId,
        kind: TypeCode,
        at: ViewPoint,
    },
    Slide {
        id: PieceId,
        to: ViewPoint,
    },
    Fall {
        id: PieceId,
        to: ViewPoint,
    },
    Pop {
        id: PieceId,
    },
    Dispose {
        id: PieceId,
    },
    Interactive(bool),
}

/// Shared log of presenter calls
pub type Journal = Arc<Mutex<Vec<PresenterCall>>>;

/// Presenter whose animations finish immediately
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    journal: Option<Journal>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presenter that records every call into the returned journal
    pub fn with_journal() -> (Self, Journal) {
        let journal = Journal::default();
        (
            Self {
                journal: Some(journal.clone()),
            },
            journal,
        )
    }

    fn record(&self, call: PresenterCall) {
        if let Some(journal) = &self.journal {
            if let Ok(mut calls) = journal.lock() {
                calls.push(call);
            }
        }
    }
}

impl Presenter for HeadlessPresenter {
    fn spawn(&mut self, piece: &Piece, at: ViewPoint) {
        self.record(PresenterCall::Spawn {
            id: piece.id,
            kind: piece.kind,
            at,
        });
    }

    fn slide(&mut self, id: PieceId, to: ViewPoint) -> Animation {
        self.record(PresenterCall::Slide { id, to });
        instant()
    }

    fn fall(&mut self, id: PieceId, to: ViewPoint) -> Animation {
        self.record(PresenterCall::Fall { id, to });
        instant()
    }

    fn pop(&mut self, id: PieceId) -> Animation {
        self.record(PresenterCall::Pop { id });
        instant()
    }

    fn dispose(&mut self, id: PieceId) {
        self.record(PresenterCall::Dispose { id });
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.record(PresenterCall::Interactive(interactive));
    }
}

/// Presenter that sleeps a fixed time per animation kind.
///
/// Stands in for real tweens when a run should take wall-clock (or tokio
/// test-clock) time.
#[derive(Debug, Clone, Copy)]
pub struct DelayPresenter {
    pub slide: Duration,
    pub fall: Duration,
    pub pop: Duration,
}

impl DelayPresenter {
    pub fn new(slide: Duration, fall: Duration, pop: Duration) -> Self {
        Self { slide, fall, pop }
    }

    /// Same duration for every animation
    pub fn uniform(duration: Duration) -> Self {
        Self::new(duration, duration, duration)
    }

    fn sleep(duration: Duration) -> Animation {
        if duration.is_zero() {
            return instant();
        }
        tokio::time::sleep(duration).boxed()
    }
}

impl Default for DelayPresenter {
    fn default() -> Self {
        // 0.5s slides, 0.3s falls, 0.1s pops
        Self::new(
            Duration::from_millis(500),
            Duration::from_millis(300),
            Duration::from_millis(100),
        )
    }
}

impl Presenter for DelayPresenter {
    fn spawn(&mut self, _piece: &Piece, _at: ViewPoint) {}

    fn slide(&mut self, _id: PieceId, _to: ViewPoint) -> Animation {
        Self::sleep(self.slide)
    }

    fn fall(&mut self, _id: PieceId, _to: ViewPoint) -> Animation {
        Self::sleep(self.fall)
    }

    fn pop(&mut self, _id: PieceId) -> Animation {
        Self::sleep(self.pop)
    }

    fn dispose(&mut self, _id: PieceId) {}
}
