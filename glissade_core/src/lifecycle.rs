// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page lifecycle coordination.
//!
//! [`LifecycleCoordinator`] is the only component that knows about host
//! navigation, visibility, and accessibility signals. It is a pure state
//! machine: each [`HostSignal`] produces a list of [`Command`]s that the
//! [`Engine`](crate::engine::Engine) executes against the frame clock and
//! the smooth-scroll controller, in order.
//!
//! ```text
//!   Idle ──Ready──► Active ──NavigationStart──► Suspended
//!                     ▲                            │
//!                     └─────NavigationFinish───────┘
//!   Active | Suspended ──Teardown──► Destroyed ──Ready──► Active
//! ```
//!
//! Visibility and reduced motion are flags, not states. The frame clock runs
//! exactly when the page is `Active`, visible, and motion is allowed. While
//! `Suspended` the clock may be stopped (tab hidden) but is never restarted:
//! navigation suspension wins over a visibility resume.
//!
//! After a ready signal or a finished navigation the scroll position is
//! reset to the top unless the URL carries a fragment, in which case the
//! browser's own anchor positioning is kept. A reload always resets.

use alloc::vec::Vec;

/// Coordinator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// No ready signal seen yet.
    Idle,
    /// Running normally.
    Active,
    /// A navigation is in flight.
    Suspended,
    /// Torn down; a new ready signal starts over.
    Destroyed,
}

/// How the current document was reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavigationType {
    /// A regular navigation or first load.
    #[default]
    Navigate,
    /// A reload of the same document.
    Reload,
    /// History traversal.
    BackForward,
}

/// A lifecycle signal from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostSignal<'a> {
    /// The application is ready.
    Ready {
        /// How the document was reached.
        navigation: NavigationType,
        /// The document URL.
        url: &'a str,
        /// Whether the document starts hidden.
        hidden: bool,
        /// Whether the user prefers reduced motion.
        reduced_motion: bool,
    },
    /// A client-side navigation began.
    NavigationStart,
    /// A client-side navigation completed.
    NavigationFinish {
        /// The new URL.
        url: &'a str,
    },
    /// The document visibility changed.
    VisibilityChanged {
        /// Whether the document is now hidden.
        hidden: bool,
    },
    /// The reduced-motion preference changed.
    ReducedMotionChanged {
        /// Whether reduced motion is now requested.
        reduce: bool,
    },
    /// Module disposal or hot reload.
    Teardown,
}

impl HostSignal<'_> {
    /// The signal's kind, without payload.
    #[must_use]
    pub const fn kind(&self) -> SignalKind {
        match self {
            Self::Ready { .. } => SignalKind::Ready,
            Self::NavigationStart => SignalKind::NavigationStart,
            Self::NavigationFinish { .. } => SignalKind::NavigationFinish,
            Self::VisibilityChanged { .. } => SignalKind::VisibilityChanged,
            Self::ReducedMotionChanged { .. } => SignalKind::ReducedMotionChanged,
            Self::Teardown => SignalKind::Teardown,
        }
    }
}

/// Payload-free [`HostSignal`] discriminant, for tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// [`HostSignal::Ready`].
    Ready,
    /// [`HostSignal::NavigationStart`].
    NavigationStart,
    /// [`HostSignal::NavigationFinish`].
    NavigationFinish,
    /// [`HostSignal::VisibilityChanged`].
    VisibilityChanged,
    /// [`HostSignal::ReducedMotionChanged`].
    ReducedMotionChanged,
    /// [`HostSignal::Teardown`].
    Teardown,
}

/// An instruction for the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Switch history scroll restoration to manual.
    ManualScrollRestoration,
    /// Attach visibility and reduced-motion listeners.
    AttachHostListeners,
    /// Detach visibility and reduced-motion listeners.
    DetachHostListeners,
    /// Create the smooth-scroll controller, destroying any previous one.
    InitScroll,
    /// Destroy the smooth-scroll controller.
    DestroyScroll,
    /// Start the frame clock.
    StartClock,
    /// Stop the frame clock.
    StopClock,
    /// Freeze the smooth-scroll controller.
    PauseScroll,
    /// Unfreeze the smooth-scroll controller.
    ResumeScroll,
    /// Cancel scrolling and jump to the top.
    ResetToTop,
    /// Cancel scrolling and adopt the native offset.
    SyncToNative,
    /// Propagate the reduced-motion preference to every component.
    SetReducedMotion(bool),
}

/// Whether a URL carries a non-empty fragment identifier.
#[must_use]
pub fn has_fragment(url: &str) -> bool {
    url.split_once('#').is_some_and(|(_, frag)| !frag.is_empty())
}

/// The lifecycle state machine.
#[derive(Clone, Debug)]
pub struct LifecycleCoordinator {
    phase: LifecyclePhase,
    hidden: bool,
    reduced_motion: bool,
    clock_running: bool,
    scroll_paused: bool,
}

impl Default for LifecycleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: LifecyclePhase::Idle,
            hidden: false,
            reduced_motion: false,
            clock_running: false,
            scroll_paused: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Whether the document is hidden, as last reported.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether reduced motion is requested, as last reported.
    #[must_use]
    pub const fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Whether the coordinator wants the frame clock running.
    #[must_use]
    pub const fn wants_clock(&self) -> bool {
        self.clock_running
    }

    /// Records that the frame clock stopped without a command, so the next
    /// transition that wants it running starts it again.
    pub fn clock_lost(&mut self) {
        self.clock_running = false;
    }

    /// Feeds a signal and returns the commands to execute, in order.
    pub fn handle(&mut self, signal: HostSignal<'_>) -> Vec<Command> {
        let mut out = Vec::new();
        match signal {
            HostSignal::Ready {
                navigation,
                url,
                hidden,
                reduced_motion,
            } => {
                if !matches!(self.phase, LifecyclePhase::Idle | LifecyclePhase::Destroyed) {
                    return out;
                }
                self.phase = LifecyclePhase::Active;
                self.hidden = hidden;
                self.reduced_motion = reduced_motion;
                self.clock_running = false;
                self.scroll_paused = false;
                out.extend([
                    Command::ManualScrollRestoration,
                    Command::AttachHostListeners,
                    Command::InitScroll,
                    Command::SetReducedMotion(reduced_motion),
                ]);
                out.push(position_command(navigation == NavigationType::Reload, url));
            }
            HostSignal::NavigationStart => {
                if self.phase == LifecyclePhase::Active {
                    self.phase = LifecyclePhase::Suspended;
                }
            }
            HostSignal::NavigationFinish { url } => match self.phase {
                LifecyclePhase::Suspended => {
                    self.phase = LifecyclePhase::Active;
                    self.reconcile(&mut out);
                    out.push(position_command(false, url));
                    return out;
                }
                LifecyclePhase::Active => out.push(position_command(false, url)),
                LifecyclePhase::Idle | LifecyclePhase::Destroyed => return out,
            },
            HostSignal::VisibilityChanged { hidden } => self.hidden = hidden,
            HostSignal::ReducedMotionChanged { reduce } => {
                self.reduced_motion = reduce;
                if self.is_live() {
                    out.push(Command::SetReducedMotion(reduce));
                }
            }
            HostSignal::Teardown => {
                if !self.is_live() {
                    return out;
                }
                self.phase = LifecyclePhase::Destroyed;
                if self.clock_running {
                    out.push(Command::StopClock);
                    self.clock_running = false;
                }
                self.scroll_paused = false;
                out.extend([Command::DestroyScroll, Command::DetachHostListeners]);
                return out;
            }
        }
        self.reconcile(&mut out);
        out
    }

    fn is_live(&self) -> bool {
        matches!(self.phase, LifecyclePhase::Active | LifecyclePhase::Suspended)
    }

    /// Emits pause/resume and start/stop commands to bring the scroll
    /// controller and clock in line with the current state and flags.
    fn reconcile(&mut self, out: &mut Vec<Command>) {
        let (want_paused, want_clock) = match self.phase {
            LifecyclePhase::Active => (self.hidden, !self.hidden && !self.reduced_motion),
            LifecyclePhase::Suspended => (
                true,
                self.clock_running && !self.hidden && !self.reduced_motion,
            ),
            LifecyclePhase::Idle | LifecyclePhase::Destroyed => return,
        };
        if want_paused != self.scroll_paused {
            self.scroll_paused = want_paused;
            out.push(if want_paused {
                Command::PauseScroll
            } else {
                Command::ResumeScroll
            });
        }
        if want_clock != self.clock_running {
            self.clock_running = want_clock;
            out.push(if want_clock {
                Command::StartClock
            } else {
                Command::StopClock
            });
        }
    }
}

fn position_command(reload: bool, url: &str) -> Command {
    if reload || !has_fragment(url) {
        Command::ResetToTop
    } else {
        Command::SyncToNative
    }
}
