//! Forwarding SIGINT from the interpreter to its foreground child.
//!
//! The router has two states. While [`RouterState::Idle`] an interrupt is
//! swallowed so the interpreter keeps running. While
//! [`RouterState::Waiting`] the same signal is re-sent to the child that the
//! launcher is blocked on.
//!
//! The OS handler cannot receive a context pointer, so the pid it forwards to
//! lives in a module-private static slot. Nothing outside this module reads or
//! writes it; callers go through the [`InterruptRouter`] owned by the
//! execution loop.

use crate::error::{Result, ShellError};
use nix::errno::Errno;
use nix::libc::c_int;
use nix::sys::signal::{
    self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal, kill, sigaction,
};
use nix::unistd::Pid;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use tracing::{debug, warn};

/// Pid value meaning "no foreground child".
const NO_CHILD: i32 = 0;

/// Shared state between the router and the signal handler.
#[derive(Debug)]
pub(crate) struct ForegroundSlot {
    pid: AtomicI32,
    interrupted: AtomicBool,
}

impl ForegroundSlot {
    const fn new() -> Self {
        Self {
            pid: AtomicI32::new(NO_CHILD),
            interrupted: AtomicBool::new(false),
        }
    }
}

static FOREGROUND: ForegroundSlot = ForegroundSlot::new();

/// Set while a router owns the process-wide handler.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Runs in signal context: only atomics and `kill(2)` are allowed here.
extern "C" fn forward_interrupt(_signum: c_int) {
    let saved_errno = Errno::last_raw();
    FOREGROUND.interrupted.store(true, Ordering::SeqCst);
    let pid = FOREGROUND.pid.load(Ordering::SeqCst);
    if pid != NO_CHILD {
        let _ = kill(Pid::from_raw(pid), Signal::SIGINT);
    }
    Errno::set_raw(saved_errno);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Waiting(Pid),
}

#[derive(Debug)]
enum Slot {
    /// The slot the installed SIGINT handler reads.
    Global,
    /// A private slot, not reachable from any signal handler.
    Detached(ForegroundSlot),
}

/// Owner of the foreground-child record.
///
/// Only one installed router can exist at a time. Dropping it restores
/// whatever SIGINT disposition was in place before; a binary that must stay
/// immune to SIGINT until it exits calls [`InterruptRouter::keep_installed`]
/// instead.
#[derive(Debug)]
pub struct InterruptRouter {
    slot: Slot,
    previous: Option<SigAction>,
}

impl InterruptRouter {
    /// Installs the forwarding SIGINT handler and returns the router bound to it.
    ///
    /// Fails with [`ShellError::RouterInstalled`] if another router already
    /// owns the handler.
    pub fn install() -> Result<Self> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(ShellError::RouterInstalled);
        }
        FOREGROUND.pid.store(NO_CHILD, Ordering::SeqCst);
        FOREGROUND.interrupted.store(false, Ordering::SeqCst);

        let action = SigAction::new(
            SigHandler::Handler(forward_interrupt),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler only touches atomics and calls kill(2), both
        // async-signal-safe.
        let previous = match unsafe { sigaction(Signal::SIGINT, &action) } {
            Ok(previous) => previous,
            Err(errno) => {
                INSTALLED.store(false, Ordering::SeqCst);
                return Err(ShellError::SignalSetup(errno));
            }
        };
        debug!("SIGINT forwarding installed");

        Ok(Self {
            slot: Slot::Global,
            previous: Some(previous),
        })
    }

    /// A router that tracks the foreground child but leaves SIGINT alone.
    ///
    /// Used when the interpreter is embedded or tested inside a process that
    /// manages its own signals.
    pub fn detached() -> Self {
        Self {
            slot: Slot::Detached(ForegroundSlot::new()),
            previous: None,
        }
    }

    /// Leaves the forwarding handler in place for the rest of the process.
    pub fn keep_installed(self) {
        if self.previous.is_some() {
            debug!("SIGINT forwarding kept until exit");
        }
        std::mem::forget(self);
    }

    fn slot(&self) -> &ForegroundSlot {
        match &self.slot {
            Slot::Global => &FOREGROUND,
            Slot::Detached(slot) => slot,
        }
    }

    pub fn state(&self) -> RouterState {
        match self.slot().pid.load(Ordering::SeqCst) {
            NO_CHILD => RouterState::Idle,
            pid => RouterState::Waiting(Pid::from_raw(pid)),
        }
    }

    /// Idle -> Waiting. Must be called with SIGINT blocked (see [`Self::block`]).
    pub(crate) fn set_foreground(&self, child: Pid) {
        let previous = self.slot().pid.swap(child.as_raw(), Ordering::SeqCst);
        if previous != NO_CHILD {
            warn!(previous, child = child.as_raw(), "foreground child replaced before being reaped");
        }
    }

    /// Waiting -> Idle, once the child has been reaped.
    pub(crate) fn clear_foreground(&self) {
        self.slot().pid.store(NO_CHILD, Ordering::SeqCst);
    }

    /// Returns whether an interrupt arrived since the last call, and resets the flag.
    pub fn take_interrupted(&self) -> bool {
        self.slot().interrupted.swap(false, Ordering::SeqCst)
    }

    /// Blocks SIGINT for the calling thread until the guard is dropped.
    ///
    /// A signal arriving in the meantime stays pending and is handled, with
    /// the foreground pid already recorded, as soon as the mask is restored.
    pub(crate) fn block(&self) -> Result<InterruptMask> {
        let mut set = SigSet::empty();
        set.add(Signal::SIGINT);
        let mut old = SigSet::empty();
        signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut old))
            .map_err(ShellError::SignalSetup)?;
        Ok(InterruptMask { old })
    }
}

impl Drop for InterruptRouter {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            // SAFETY: restoring the disposition that was installed before ours.
            if let Err(err) = unsafe { sigaction(Signal::SIGINT, &previous) } {
                warn!(%err, "failed to restore SIGINT disposition");
            }
            INSTALLED.store(false, Ordering::SeqCst);
        }
    }
}

/// Restores the previous signal mask on drop.
#[must_use]
pub(crate) struct InterruptMask {
    old: SigSet,
}

impl Drop for InterruptMask {
    fn drop(&mut self) {
        let _ = signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.old), None);
    }
}

/// Puts SIGINT back to its default state in a freshly forked child.
///
/// The child inherits both our handler and the blocked mask; the program it
/// executes must see a plain, deliverable SIGINT.
pub(crate) fn reset_in_child() {
    // SAFETY: SIG_DFL installs no Rust code as a handler.
    let _ = unsafe { signal::signal(Signal::SIGINT, SigHandler::SigDfl) };
    let mut set = SigSet::empty();
    set.add(Signal::SIGINT);
    let _ = signal::sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&set), None);
}
