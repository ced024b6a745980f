//! # IdleSupervisor: idle tracking, timer arming, and shutdown routing.
//!
//! [`IdleSupervisor`] is a decorator placed in front of a long-lived
//! [`CompileService`]. It exposes the identical capability set, counts the
//! tracked calls in flight, and arms a one-shot idle timer whenever that
//! count reaches zero. If the timer elapses before a new call arrives, the
//! [`ShutdownTarget`](crate::ShutdownTarget) is invoked with a
//! human-readable idle reason.
//!
//! ## High-level architecture
//! ```text
//! caller ──► IdleSupervisor::compile()/sys_info()
//!               │ start_call():  count 0→1 ⇒ disarm pending timer
//!               ▼
//!            delegate.compile()/sys_info()          (result passes through)
//!               │
//!               ▼
//!               end_call():    count 1→0 ⇒ arm timer(idle_timeout)
//!
//! timer task (independent):
//!   sleep(idle_timeout) ──► commit under slot lock ──► target.shutdown(reason)
//!
//! untracked:
//!   shutdown()        ──► disarm timer, mark terminated, forward to delegate
//!   server_settings() ──► pure passthrough (never touches idle state)
//! ```
//!
//! Ending the call is tied to a guard's `Drop`, not to the delegate
//! completing: if the caller abandons the tracked future mid-flight
//! (`tokio::time::timeout`, `select!`), the count still returns to zero and
//! the idle window still re-arms.
//!
//! ## State machine
//! ```text
//!            start_call (disarm)                 timer fires (commit)
//!   Idle ──────────────────────────► Active      Idle ─────────────────► Terminated
//!   count=0, timer armed             count>0
//!            end_call, count==0
//!   Active ────────────────────────► Idle (re-arm)
//!            shutdown()
//!   any ───────────────────────────► Terminated (absorbing)
//! ```
//!
//! ## Locking policy
//! The outstanding-call count and the pending timer handle are a *pair*: the
//! decision to arm or disarm depends on the count transition, so both
//! mutations happen inside one critical section, the `TimerSlot` mutex. The
//! lock is never held across an `.await`. The fired timer action re-acquires
//! the same lock to *commit* the shutdown: it proceeds only if its epoch is
//! still current and a handle is still pending, so a racing `start_call`
//! either disarms first (the fire aborts) or observes the terminated slot.
//! The actual [`ShutdownTarget::shutdown`](crate::ShutdownTarget::shutdown)
//! invocation happens after the commit, outside the lock, and must tolerate
//! calls racing in behind the decision.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use idlevisor::{
//!     CompilationResult, CompileRequest, CompileService, Config, IdleSupervisor,
//!     ServiceError, ShutdownFn, SysInfo,
//! };
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl CompileService for Echo {
//!     async fn sys_info(&self) -> Result<SysInfo, ServiceError> {
//!         Ok(SysInfo::new(4, 1 << 30))
//!     }
//!     async fn compile(&self, _req: CompileRequest) -> Result<CompilationResult, ServiceError> {
//!         Ok(CompilationResult::new(0))
//!     }
//!     async fn shutdown(&self) -> Result<(), ServiceError> {
//!         Ok(())
//!     }
//!     async fn server_settings(&self) -> Result<String, ServiceError> {
//!         Ok("defaults".into())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), ServiceError> {
//!     let mut cfg = Config::default();
//!     cfg.idle_timeout = Duration::from_secs(30);
//!
//!     let target = ShutdownFn::arc(|reason: String| async move {
//!         println!("terminating: {reason}");
//!     });
//!
//!     let sup = IdleSupervisor::new(Arc::new(Echo), target, cfg, Vec::new());
//!     let info = sup.sys_info().await?;
//!     assert_eq!(info.num_cores, 4);
//!
//!     sup.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::core::timer::{IdleTimer, TimerHandle};
use crate::core::tracker::CallTracker;
use crate::error::{ServiceError, SupervisorError};
use crate::events::{Bus, Event, EventKind};
use crate::service::{
    CompilationResult, CompileRequest, CompileService, ServiceRef, SysInfo, TargetRef,
};
use crate::subscribers::{Subscribe, SubscriberSet};

/// The guarded composite state behind the idle-tracking decisions.
///
/// Invariant (until `terminated`): `pending` is `Some` iff the outstanding
/// call count is zero, and at most one handle exists at any time.
#[derive(Debug, Default)]
struct TimerSlot {
    /// The scheduled-but-not-yet-fired idle action, if any.
    pending: Option<TimerHandle>,
    /// Bumped on every arm; lets a stale fire recognise it lost the race.
    epoch: u64,
    /// Set once by the timer commit or an explicit `shutdown()`; absorbing.
    terminated: bool,
}

/// Decorator that shuts a [`CompileService`] down after an idle period.
///
/// Wraps a delegate service and exposes the same capability set. The
/// tracked operations (`sys_info`, `compile`) drive the idle machinery;
/// `shutdown` and `server_settings` are forwarded without tracking.
///
/// Construction arms the first idle window immediately (the call count
/// starts at zero), so a supervisor that never receives a call still shuts
/// the target down after `idle_timeout`.
pub struct IdleSupervisor {
    /// The wrapped service actually performing requests.
    delegate: ServiceRef,
    /// Invoked when the idle timeout elapses.
    target: TargetRef,
    /// Idle window, fixed at construction.
    idle_timeout: Duration,
    /// Lock-free count of outstanding tracked calls.
    calls: CallTracker,
    /// One-shot scheduler for the idle action.
    timer: IdleTimer,
    /// {pending handle, epoch, terminated}, guarded as one unit.
    slot: Arc<Mutex<TimerSlot>>,
    /// Lifecycle event bus shared with the timer task.
    pub bus: Bus,
}

impl IdleSupervisor {
    /// Creates a supervisor around `delegate` and arms the first idle window.
    ///
    /// `subscribers` receive every lifecycle event published after the
    /// listener is wired, which happens before the initial timer is armed.
    /// Pass an empty vec if event delivery is not needed; the public
    /// [`bus`](Self::bus) can still be subscribed to directly.
    ///
    /// Must be called within a Tokio runtime (the timer and listener are
    /// spawned tasks).
    pub fn new(
        delegate: ServiceRef,
        target: TargetRef,
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let sup = Self {
            delegate,
            target,
            idle_timeout: cfg.idle_timeout,
            calls: CallTracker::new(),
            timer: IdleTimer::new(),
            slot: Arc::new(Mutex::new(TimerSlot::default())),
            bus,
        };
        sup.subscriber_listener(subscribers);

        // Count starts at zero: the supervisor is born Idle, timer armed.
        let mut slot = sup.lock_slot();
        sup.arm(&mut slot);
        drop(slot);
        sup
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    fn subscriber_listener(&self, subscribers: Vec<Arc<dyn Subscribe>>) {
        if subscribers.is_empty() {
            return;
        }
        let set = SubscriberSet::new(subscribers);
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev).await;
            }
        });
    }

    /// Locks the timer slot, recovering from a poisoned lock.
    ///
    /// The critical sections under this lock contain no panicking code of
    /// our own; a poison can only come from a panicking test assertion, in
    /// which case the inner state is still consistent.
    fn lock_slot(&self) -> MutexGuard<'_, TimerSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a tracked call as started.
    ///
    /// On the 0→1 transition the pending idle timer is disarmed. A missing
    /// handle on that transition is an invariant breach and is surfaced,
    /// never swallowed. The breach is detected *before* the count commits,
    /// so a rejected call leaves no unpaired increment behind.
    fn start_call(&self) -> Result<(), SupervisorError> {
        let mut slot = self.lock_slot();

        // All count transitions happen under this lock, so a zero count
        // here means this call would be the 0→1 transition.
        if !slot.terminated && self.calls.get() == 0 && slot.pending.is_none() {
            return Err(SupervisorError::TimerNotScheduled);
        }

        let outstanding = self.calls.increment();
        self.bus
            .publish(Event::now(EventKind::CallStarted).with_outstanding(outstanding));

        // After termination the timer machinery is out of the picture;
        // whether the delegate still accepts calls is its own concern.
        if slot.terminated {
            return Ok(());
        }
        if outstanding == 1 {
            if let Some(handle) = slot.pending.take() {
                handle.cancel();
                self.bus.publish(Event::now(EventKind::TimerCanceled));
            }
        }
        Ok(())
    }

    /// Marks a tracked call as completed.
    ///
    /// On the 1→0 transition a fresh idle timer is armed. A handle already
    /// pending at that point would mean a double schedule.
    fn end_call(&self) -> Result<(), SupervisorError> {
        let mut slot = self.lock_slot();
        let outstanding = self.calls.decrement();
        self.bus
            .publish(Event::now(EventKind::CallCompleted).with_outstanding(outstanding));

        if slot.terminated {
            return Ok(());
        }
        if outstanding == 0 {
            if slot.pending.is_some() {
                return Err(SupervisorError::TimerAlreadyScheduled);
            }
            self.arm(&mut slot);
        }
        Ok(())
    }

    /// Starts a tracked call and returns a guard that ends it.
    ///
    /// The guard pairs the increment on *every* exit: [`CallGuard::finish`]
    /// is the normal path and surfaces `end_call`'s invariant errors; if
    /// the tracked future is dropped before completing (caller timeout,
    /// `select!` abandonment, client disconnect), the guard's `Drop` still
    /// runs `end_call` so the count and timer stay paired.
    fn track_call(&self) -> Result<CallGuard<'_>, SupervisorError> {
        self.start_call()?;
        Ok(CallGuard {
            sup: self,
            armed: true,
        })
    }

    /// Arms the idle timer and stores the pending handle in the slot.
    ///
    /// The caller must hold the slot lock and have verified no handle is
    /// pending. The scheduled action commits under the same lock before it
    /// touches the target, so exactly one of {disarm, fire} wins.
    fn arm(&self, slot: &mut TimerSlot) {
        slot.epoch = slot.epoch.wrapping_add(1);
        let epoch = slot.epoch;

        let slot_ref = Arc::clone(&self.slot);
        let target = Arc::clone(&self.target);
        let bus = self.bus.clone();
        let reason = idle_reason(self.idle_timeout);

        let handle = self.timer.schedule(self.idle_timeout, async move {
            let committed = {
                let mut slot = slot_ref.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.terminated || slot.epoch != epoch || slot.pending.is_none() {
                    false
                } else {
                    slot.pending = None;
                    slot.terminated = true;
                    true
                }
            };
            if committed {
                bus.publish(Event::now(EventKind::TimeoutExpired).with_reason(reason.clone()));
                target.shutdown(&reason).await;
            }
        });

        self.bus
            .publish(Event::now(EventKind::TimerScheduled).with_delay(self.idle_timeout));
        slot.pending = Some(handle);
    }

    /// Disarms the pending timer (if any) and makes termination absorbing.
    fn cancel_and_terminate(&self) {
        let mut slot = self.lock_slot();
        if let Some(handle) = slot.pending.take() {
            handle.cancel();
            self.bus.publish(Event::now(EventKind::TimerCanceled));
        }
        slot.terminated = true;
        drop(slot);
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
    }
}

/// Scope guard for a tracked call; created by
/// [`IdleSupervisor::track_call`] once `start_call` has committed.
struct CallGuard<'a> {
    sup: &'a IdleSupervisor,
    armed: bool,
}

impl CallGuard<'_> {
    /// Ends the call on the normal path, surfacing invariant errors.
    fn finish(mut self) -> Result<(), SupervisorError> {
        self.armed = false;
        self.sup.end_call()
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Abandoned mid-flight. `Drop` cannot return the invariant error,
        // so a breach goes to the bus instead.
        if let Err(err) = self.sup.end_call() {
            self.sup
                .bus
                .publish(Event::now(EventKind::InvariantBreached).with_reason(err.to_string()));
        }
    }
}

/// Human-readable idle reason handed to the shutdown target.
fn idle_reason(idle_timeout: Duration) -> String {
    format!(
        "server has been idle for {} seconds",
        idle_timeout.as_secs()
    )
}

#[async_trait]
impl CompileService for IdleSupervisor {
    /// Tracked: participates in idle accounting.
    async fn sys_info(&self) -> Result<SysInfo, ServiceError> {
        let guard = self.track_call()?;
        let result = self.delegate.sys_info().await;
        guard.finish()?;
        result
    }

    /// Tracked: participates in idle accounting. The delegate's result or
    /// error passes through unchanged; the call is ended on success,
    /// failure, and abandonment alike.
    async fn compile(&self, req: CompileRequest) -> Result<CompilationResult, ServiceError> {
        let guard = self.track_call()?;
        let result = self.delegate.compile(req).await;
        guard.finish()?;
        result
    }

    /// Untracked: disarms the pending timer and forwards to the delegate.
    ///
    /// Does not wait for outstanding tracked calls. Calling it twice is not
    /// an error: the second call finds no timer to disarm and forwards to
    /// the delegate again.
    async fn shutdown(&self) -> Result<(), ServiceError> {
        self.cancel_and_terminate();
        self.delegate.shutdown().await
    }

    /// Untracked: pure passthrough. Deliberately does not reset idleness —
    /// a metadata query is not service activity.
    async fn server_settings(&self) -> Result<String, ServiceError> {
        self.delegate.server_settings().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Delegate stub: sleeps a configurable amount per tracked call and
    /// counts invocations.
    struct StubService {
        default_work_ms: u64,
        work_queue: Mutex<VecDeque<u64>>,
        fail_next_compile: AtomicBool,
        compiles: AtomicUsize,
        settings: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    impl StubService {
        fn new(default_work_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                default_work_ms,
                work_queue: Mutex::new(VecDeque::new()),
                fail_next_compile: AtomicBool::new(false),
                compiles: AtomicUsize::new(0),
                settings: AtomicUsize::new(0),
                shutdowns: AtomicUsize::new(0),
            })
        }

        fn queue_work(&self, ms: &[u64]) {
            let mut q = self.work_queue.lock().expect("work queue poisoned");
            q.extend(ms.iter().copied());
        }

        fn next_work(&self) -> Duration {
            let mut q = self.work_queue.lock().expect("work queue poisoned");
            Duration::from_millis(q.pop_front().unwrap_or(self.default_work_ms))
        }
    }

    #[async_trait]
    impl CompileService for StubService {
        async fn sys_info(&self) -> Result<SysInfo, ServiceError> {
            tokio::time::sleep(self.next_work()).await;
            Ok(SysInfo::new(4, 1 << 30))
        }

        async fn compile(&self, _req: CompileRequest) -> Result<CompilationResult, ServiceError> {
            self.compiles.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.next_work()).await;
            if self.fail_next_compile.swap(false, Ordering::SeqCst) {
                return Err(ServiceError::Failed {
                    error: "stub compile failure".into(),
                });
            }
            Ok(CompilationResult::new(0))
        }

        async fn shutdown(&self) -> Result<(), ServiceError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn server_settings(&self) -> Result<String, ServiceError> {
            self.settings.fetch_add(1, Ordering::SeqCst);
            Ok("--startserver".into())
        }
    }

    /// Shutdown target stub: counts firings and records the last reason.
    struct RecordingTarget {
        fired: AtomicUsize,
        last_reason: Mutex<Option<String>>,
    }

    impl RecordingTarget {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fired: AtomicUsize::new(0),
                last_reason: Mutex::new(None),
            })
        }

        fn count(&self) -> usize {
            self.fired.load(Ordering::SeqCst)
        }

        fn reason(&self) -> Option<String> {
            self.last_reason.lock().expect("reason poisoned").clone()
        }
    }

    #[async_trait]
    impl crate::service::ShutdownTarget for RecordingTarget {
        async fn shutdown(&self, reason: &str) {
            self.fired.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last_reason.lock().expect("reason poisoned");
            *last = Some(reason.to_string());
        }
    }

    fn cfg(idle_ms: u64) -> Config {
        Config {
            idle_timeout: Duration::from_millis(idle_ms),
            ..Config::default()
        }
    }

    fn req() -> CompileRequest {
        CompileRequest {
            protocol_id: "proto-1".into(),
            invocation_id: "inv-1".into(),
            args: vec!["-d".into(), "out".into()],
            ..CompileRequest::default()
        }
    }

    /// Lets spawned tasks (timer, listener) run without advancing time.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    fn count_kind(kinds: &[EventKind], kind: EventKind) -> usize {
        kinds.iter().filter(|k| **k == kind).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_exactly_once_after_idle_timeout_with_second_reason() {
        let delegate = StubService::new(10);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(1_000),
            Vec::new(),
        );

        // t=0: compile starts, returns at t=10ms; idle window re-arms then.
        sup.compile(req()).await.expect("compile failed");
        assert_eq!(delegate.compiles.load(Ordering::SeqCst), 1);

        // t=1000 < 1010: nothing fired yet.
        tokio::time::sleep(Duration::from_millis(990)).await;
        settle().await;
        assert_eq!(target.count(), 0, "fired before the idle window elapsed");

        // t=1015 > 1010: fired exactly once, reason names the idle second.
        tokio::time::sleep(Duration::from_millis(25)).await;
        settle().await;
        assert_eq!(target.count(), 1);
        let reason = target.reason().expect("no reason recorded");
        assert!(reason.contains('1'), "reason {reason:?} lacks the second count");

        // Much later: still exactly once.
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(target.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fire_while_calls_outstanding_and_single_reschedule() {
        let delegate = StubService::new(0);
        delegate.queue_work(&[50, 55]);
        let target = RecordingTarget::new();
        let sup = Arc::new(IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(1_000),
            Vec::new(),
        ));
        let mut rx = sup.bus.subscribe();

        // A: starts t=0, ends t=50. B: starts t=5 (A active), ends t=60.
        let a = {
            let sup = Arc::clone(&sup);
            tokio::spawn(async move { sup.compile(req()).await })
        };
        settle().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let b = {
            let sup = Arc::clone(&sup);
            tokio::spawn(async move { sup.compile(req()).await })
        };

        a.await.expect("join A").expect("A failed");
        b.await.expect("join B").expect("B failed");
        settle().await;

        let kinds = drain(&mut rx);
        assert_eq!(
            count_kind(&kinds, EventKind::TimerCanceled),
            1,
            "timer must be disarmed exactly once, at A's start"
        );
        assert_eq!(
            count_kind(&kinds, EventKind::TimerScheduled),
            1,
            "timer must be re-armed exactly once, at B's end"
        );
        assert_eq!(target.count(), 0, "fired while calls were outstanding");
        assert_eq!(sup.calls.get(), 0);
        assert!(sup.lock_slot().pending.is_some(), "no timer pending after quiescence");

        // The re-armed window starts at t=60: fires once at t=1060.
        tokio::time::sleep(Duration::from_millis(1_010)).await;
        settle().await;
        assert_eq!(target.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracked_call_while_idle_cancels_exactly_one_timer() {
        let delegate = StubService::new(20);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(1_000),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        sup.sys_info().await.expect("sys_info failed");

        let kinds = drain(&mut rx);
        assert_eq!(count_kind(&kinds, EventKind::TimerCanceled), 1);
        assert_eq!(count_kind(&kinds, EventKind::TimerScheduled), 1);
        assert_eq!(target.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_shutdown_cancels_timer_and_is_repeatable() {
        let delegate = StubService::new(0);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(500),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        sup.shutdown().await.expect("shutdown failed");
        assert_eq!(delegate.shutdowns.load(Ordering::SeqCst), 1);

        // The disarmed timer never fires, even long past the window.
        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(target.count(), 0);

        // Repeat shutdown: not an error, nothing left to disarm.
        sup.shutdown().await.expect("second shutdown errored");
        assert_eq!(delegate.shutdowns.load(Ordering::SeqCst), 2);

        let kinds = drain(&mut rx);
        assert_eq!(count_kind(&kinds, EventKind::TimerCanceled), 1);
        assert_eq!(count_kind(&kinds, EventKind::ShutdownRequested), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_settings_does_not_reset_idleness() {
        let delegate = StubService::new(0);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(1_000),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        // Metadata queries sprinkled through the idle window.
        tokio::time::sleep(Duration::from_millis(400)).await;
        sup.server_settings().await.expect("settings failed");
        tokio::time::sleep(Duration::from_millis(400)).await;
        sup.server_settings().await.expect("settings failed");
        assert_eq!(delegate.settings.load(Ordering::SeqCst), 2);

        // The window armed at construction still closes at t=1000.
        tokio::time::sleep(Duration::from_millis(190)).await;
        settle().await;
        assert_eq!(target.count(), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        settle().await;
        assert_eq!(target.count(), 1, "settings calls must not reset the window");

        let kinds = drain(&mut rx);
        assert_eq!(count_kind(&kinds, EventKind::CallStarted), 0);
        assert_eq!(count_kind(&kinds, EventKind::CallCompleted), 0);
        assert_eq!(sup.calls.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delegate_failure_still_ends_call_and_rearms() {
        let delegate = StubService::new(10);
        delegate.fail_next_compile.store(true, Ordering::SeqCst);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(1_000),
            Vec::new(),
        );

        let err = sup.compile(req()).await.expect_err("stub should fail");
        assert!(matches!(err, ServiceError::Failed { .. }));
        assert!(!err.is_invariant());

        // The failed call still re-armed the window at t=10.
        assert_eq!(sup.calls.get(), 0);
        assert!(sup.lock_slot().pending.is_some());
        tokio::time::sleep(Duration::from_millis(1_020)).await;
        settle().await;
        assert_eq!(target.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_tracked_call_still_rearms_and_fires() {
        let delegate = StubService::new(50);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(100),
            Vec::new(),
        );
        let mut rx = sup.bus.subscribe();

        // The caller gives up after 5ms; the stub needs 50.
        let abandoned = tokio::time::timeout(Duration::from_millis(5), sup.compile(req())).await;
        assert!(abandoned.is_err(), "stub finished before the caller timeout");

        // Dropping the tracked future must still pair the call: count back
        // to zero, idle window re-armed from the abandonment point.
        assert_eq!(sup.calls.get(), 0, "abandoned call leaked the count");
        assert!(sup.lock_slot().pending.is_some(), "timer not re-armed");
        let kinds = drain(&mut rx);
        assert_eq!(count_kind(&kinds, EventKind::CallStarted), 1);
        assert_eq!(count_kind(&kinds, EventKind::CallCompleted), 1);
        assert_eq!(count_kind(&kinds, EventKind::TimerScheduled), 1);

        // Window armed at t=5 closes at t=105.
        tokio::time::sleep(Duration::from_millis(110)).await;
        settle().await;
        assert_eq!(target.count(), 1, "idle shutdown lost after abandonment");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_rescheduling_after_fire() {
        let delegate = StubService::new(5);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(100),
            Vec::new(),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        settle().await;
        assert_eq!(target.count(), 1);

        let mut rx = sup.bus.subscribe();

        // Tracked calls after termination pass through, but no timer logic runs.
        sup.compile(req()).await.expect("post-fire compile failed");
        settle().await;

        let kinds = drain(&mut rx);
        assert_eq!(count_kind(&kinds, EventKind::TimerScheduled), 0);
        assert_eq!(count_kind(&kinds, EventKind::TimerCanceled), 0);
        assert!(sup.lock_slot().pending.is_none());
        assert!(sup.lock_slot().terminated);

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(target.count(), 1, "terminated supervisor fired again");
    }

    #[tokio::test(start_paused = true)]
    async fn test_paired_bursts_leave_count_zero_and_one_pending_timer() {
        let delegate = StubService::new(1);
        let target = RecordingTarget::new();
        let sup = Arc::new(IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(10_000),
            Vec::new(),
        ));

        let mut joins = Vec::new();
        for _ in 0..4 {
            let sup = Arc::clone(&sup);
            joins.push(tokio::spawn(async move {
                for _ in 0..5 {
                    sup.compile(req()).await.expect("burst compile failed");
                }
            }));
        }
        for j in joins {
            j.await.expect("burst task panicked");
        }
        settle().await;

        assert_eq!(sup.calls.get(), 0);
        let slot = sup.lock_slot();
        assert!(slot.pending.is_some(), "quiescent supervisor lacks a timer");
        assert!(!slot.terminated);
        drop(slot);
        assert_eq!(target.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_timer_on_start_surfaces_invariant_error() {
        let delegate = StubService::new(0);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(1_000),
            Vec::new(),
        );

        // Break the invariant by hand: steal the pending handle.
        let stolen = sup.lock_slot().pending.take().expect("no initial timer");
        stolen.cancel();

        let err = sup.sys_info().await.expect_err("invariant breach not surfaced");
        assert!(err.is_invariant());
        assert!(matches!(
            err,
            ServiceError::Supervisor(SupervisorError::TimerNotScheduled)
        ));

        // The rejected call must not commit an increment it cannot pair.
        assert_eq!(sup.calls.get(), 0, "rejected call skewed the count");
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_schedule_surfaces_invariant_error() {
        let delegate = StubService::new(0);
        let target = RecordingTarget::new();
        let sup = IdleSupervisor::new(
            delegate.clone(),
            target.clone(),
            cfg(1_000),
            Vec::new(),
        );

        // Simulate the double-schedule hazard: a call is active, yet a
        // handle sneaks back into the slot before the call ends.
        sup.start_call().expect("start failed");
        {
            let mut slot = sup.lock_slot();
            sup.arm(&mut slot);
        }
        let err = sup.end_call().expect_err("double schedule not detected");
        assert_eq!(err, SupervisorError::TimerAlreadyScheduled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_observe_lifecycle() {
        struct Counting {
            seen: AtomicUsize,
        }

        #[async_trait]
        impl Subscribe for Counting {
            async fn on_event(&self, _event: &Event) {
                self.seen.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counting = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let delegate = StubService::new(5);
        let target = RecordingTarget::new();
        let subs: Vec<Arc<dyn Subscribe>> = vec![counting.clone()];
        let sup = IdleSupervisor::new(delegate.clone(), target.clone(), cfg(1_000), subs);

        sup.compile(req()).await.expect("compile failed");
        settle().await;

        // Initial arm + started + canceled + completed + re-arm.
        assert!(counting.seen.load(Ordering::SeqCst) >= 5);
    }
}
