use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tbot::types::chat;
use tokio::{
    sync::{watch, Notify},
    time::{self, delay_queue, DelayQueue, Instant},
};
use tracing::{debug, warn};

use self::session::{BreathingSession, Snapshot};

use crate::{
    companion::Companion,
    config::{BreathingConfig, Config},
    journal::Journal,
};

pub(crate) mod periodic;
pub(crate) mod phase;
pub(crate) mod session;

/// The bot's state.
pub(crate) struct State {
    /// Breathing sessions and the timers driving them.
    timers: Mutex<Timers>,
    /// Woken whenever timers are armed, so the driver notices new deadlines.
    armed: Notify,
    breathing: BreathingConfig,
    pub(crate) companion: Companion,
    pub(crate) journal: Journal,
}

/// Everything guarded by the timer lock.
///
/// The queue and the sessions live under the same lock: a handle stored in an entry is always
/// still present in the queue.
#[derive(Default)]
struct Timers {
    /// A queue that holds information about which timer is going to expire next.
    queue: DelayQueue<Timer>,
    /// Breathing sessions by chat. Entries are never removed, a session is restartable.
    entries: HashMap<chat::Id, Entry>,
}

/// Outcome of a start request.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Start {
    /// An idle session was started as a new run.
    Started,
    /// A running session was reset to the beginning of the cycle.
    Restarted,
}

/// Which of the two scheduled callbacks of a session fired.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub(crate) enum TimerKind {
    /// The periodic tick
    Tick,
    /// The one-shot end of the session
    Expiry,
}

/// A scheduled callback, identified by the chat of its session.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub(crate) struct Timer {
    pub(crate) chat_id: chat::Id,
    pub(crate) kind: TimerKind,
    /// Which arming of the session scheduled this timer.
    pub(crate) arming: u64,
}

/// Result of a fired timer.
#[derive(Debug)]
pub(crate) struct Fired {
    pub(crate) timer: Timer,
    /// True if the session changed.
    pub(crate) changed: bool,
}

/// The two handles a running session owns. They are acquired and released together.
#[derive(Debug)]
struct TimerHandles {
    arming: u64,
    tick: delay_queue::Key,
    tick_at: Instant,
    expiry: delay_queue::Key,
    expiry_at: Instant,
}

impl TimerHandles {
    fn arm(
        queue: &mut DelayQueue<Timer>,
        chat_id: chat::Id,
        arming: u64,
        config: &BreathingConfig,
    ) -> Self {
        let now = Instant::now();
        let timer = |kind| Timer {
            chat_id,
            kind,
            arming,
        };
        let tick_at = now + config.tick_interval;
        let expiry_at = now + config.session_length;
        TimerHandles {
            arming,
            tick: queue.insert_at(timer(TimerKind::Tick), tick_at),
            tick_at,
            expiry: queue.insert_at(timer(TimerKind::Expiry), expiry_at),
            expiry_at,
        }
    }

    fn release(self, queue: &mut DelayQueue<Timer>) {
        cancel(queue, &self.tick, self.tick_at);
        cancel(queue, &self.expiry, self.expiry_at);
    }
}

/// Take a timer out of the queue unless it is already due.
///
/// The queue can't remove an entry it is in the middle of yielding. A due timer is left in place
/// and dropped when it fires, since its arming no longer matches the session.
fn cancel(queue: &mut DelayQueue<Timer>, key: &delay_queue::Key, deadline: Instant) {
    if deadline > Instant::now() {
        queue.remove(key);
    }
}

/// A breathing session together with its timers and subscribers.
struct Entry {
    session: BreathingSession,
    /// Generation of the session, see `Snapshot::run`.
    run: u64,
    /// Ticks since the session was (re)started.
    ticks: u32,
    /// Number of times timers were armed for this chat.
    armings: u64,
    handles: Option<TimerHandles>,
    publisher: watch::Sender<Snapshot>,
    subscriber: watch::Receiver<Snapshot>,
}

impl Entry {
    fn new() -> Self {
        let (publisher, subscriber) = watch::channel(Snapshot::default());
        Entry {
            session: BreathingSession::Idle,
            run: 0,
            ticks: 0,
            armings: 0,
            handles: None,
            publisher,
            subscriber,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::of(self.run, self.ticks, &self.session)
    }

    fn publish(&self) {
        // The entry holds a receiver itself, so broadcasting cannot fail.
        let _ = self.publisher.broadcast(self.snapshot());
    }

    /// Release the current timers and arm a fresh pair.
    fn arm(
        &mut self,
        queue: &mut DelayQueue<Timer>,
        chat_id: chat::Id,
        config: &BreathingConfig,
    ) {
        if let Some(handles) = self.handles.take() {
            handles.release(queue);
        }
        self.armings += 1;
        self.handles = Some(TimerHandles::arm(queue, chat_id, self.armings, config));
    }

    /// Release both timers and put the session to rest.
    fn stop(&mut self, queue: &mut DelayQueue<Timer>) -> bool {
        if let Some(handles) = self.handles.take() {
            handles.release(queue);
        }
        let stopped = self.session.stop();
        if stopped {
            self.publish();
        }
        stopped
    }

    /// Apply a timer that was just yielded by the queue.
    fn fire(
        &mut self,
        queue: &mut DelayQueue<Timer>,
        timer: Timer,
        deadline: Instant,
        tick_interval: core::time::Duration,
    ) -> bool {
        if self.handles.as_ref().map(|handles| handles.arming) != Some(timer.arming) {
            debug!(
                chat = %timer.chat_id,
                kind = ?timer.kind,
                "dropping a timer of an earlier arming"
            );
            return false;
        }
        match timer.kind {
            TimerKind::Tick => {
                // Schedule from the previous deadline so the cadence doesn't drift.
                if let Some(handles) = self.handles.as_mut() {
                    let at = deadline + tick_interval;
                    handles.tick = queue.insert_at(timer, at);
                    handles.tick_at = at;
                }
                self.ticks += 1;
                let changed = self.session.tick();
                self.publish();
                changed
            }
            TimerKind::Expiry => {
                // The expiry key left the queue when it fired, only the tick is left to cancel.
                if let Some(handles) = self.handles.take() {
                    cancel(queue, &handles.tick, handles.tick_at);
                }
                let stopped = self.session.stop();
                self.publish();
                stopped
            }
        }
    }
}

impl State {
    pub(crate) fn new(breathing: BreathingConfig, companion: Companion) -> Self {
        State {
            timers: Mutex::new(Timers::default()),
            armed: Notify::new(),
            breathing,
            companion,
            journal: Journal::default(),
        }
    }

    pub(crate) fn from_config(config: &Config) -> Self {
        State::new(config.breathing.clone(), Companion::new(config.reply_delay))
    }

    pub(crate) fn breathing(&self) -> &BreathingConfig {
        &self.breathing
    }

    /// Start the breathing exercise in a chat.
    ///
    /// Both the tick and the expiry timer are (re)armed. Starting a running session resets it
    /// without ending it, so existing subscribers keep following the same run.
    pub(crate) fn start_breathing(&self, chat_id: chat::Id) -> Start {
        let outcome;
        {
            let mut timers = self.timers();
            let Timers { queue, entries } = &mut *timers;
            let entry = entries.entry(chat_id).or_insert_with(Entry::new);

            outcome = if entry.session.is_active() {
                Start::Restarted
            } else {
                entry.run += 1;
                Start::Started
            };

            entry.arm(queue, chat_id, &self.breathing);
            entry.session.start();
            entry.ticks = 0;
            entry.publish();
            debug!(chat = %chat_id, run = entry.run, "breathing session started");
        }
        self.armed.notify();
        outcome
    }

    /// Stop the breathing exercise in a chat and cancel its timers.
    ///
    /// Returns true if a session was running. Stopping an idle session is a no-op.
    pub(crate) fn stop_breathing(&self, chat_id: chat::Id) -> bool {
        let mut timers = self.timers();
        let Timers { queue, entries } = &mut *timers;
        match entries.get_mut(&chat_id) {
            Some(entry) => {
                let stopped = entry.stop(queue);
                if stopped {
                    debug!(chat = %chat_id, run = entry.run, "breathing session stopped");
                }
                stopped
            }
            None => false,
        }
    }

    /// Subscribe to the breathing session of a chat.
    ///
    /// The receiver starts out with the current state of the session.
    pub(crate) fn subscribe(&self, chat_id: chat::Id) -> watch::Receiver<Snapshot> {
        self.timers()
            .entries
            .entry(chat_id)
            .or_insert_with(Entry::new)
            .subscriber
            .clone()
    }

    /// Return the current state of the breathing session in a chat.
    #[cfg(test)]
    pub(crate) fn snapshot(&self, chat_id: chat::Id) -> Snapshot {
        self.timers()
            .entries
            .get(&chat_id)
            .map(Entry::snapshot)
            .unwrap_or_default()
    }

    /// Return the number of timers a chat's session currently holds.
    #[cfg(test)]
    pub(crate) fn pending_timers(&self, chat_id: chat::Id) -> usize {
        match self.timers().entries.get(&chat_id) {
            Some(Entry {
                handles: Some(_), ..
            }) => 2,
            _ => 0,
        }
    }

    /// Stop every running session, releasing all timers.
    pub(crate) fn shutdown(&self) -> usize {
        let mut timers = self.timers();
        let Timers { queue, entries } = &mut *timers;
        entries
            .values_mut()
            .map(|entry| entry.stop(queue))
            .filter(|stopped| *stopped)
            .count()
    }

    /// Poll the queue for the next expired timer and apply it to its session.
    ///
    /// Returns `Poll::Ready(None)` if no timers are armed.
    pub(crate) fn poll_expired(
        &self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Fired, time::Error>>> {
        let mut timers = self.timers();
        let Timers { queue, entries } = &mut *timers;
        let expired = match queue.poll_expired(cx) {
            Poll::Ready(Some(Ok(expired))) => expired,
            Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Pending => return Poll::Pending,
        };

        let deadline = expired.deadline();
        let timer = expired.into_inner();
        let changed = match entries.get_mut(&timer.chat_id) {
            Some(entry) => entry.fire(queue, timer, deadline, self.breathing.tick_interval),
            None => {
                warn!(chat = %timer.chat_id, "timer fired for an unknown chat");
                false
            }
        };
        Poll::Ready(Some(Ok(Fired { timer, changed })))
    }

    /// Wait until timers have been armed.
    pub(crate) async fn armed(&self) {
        self.armed.notified().await
    }

    /// Expire one of a session's timers right away, as if its deadline had passed.
    #[cfg(test)]
    fn expire_now(&self, chat_id: chat::Id, kind: TimerKind) -> bool {
        let mut timers = self.timers();
        let Timers { queue, entries } = &mut *timers;
        let entry = match entries.get_mut(&chat_id) {
            Some(entry) => entry,
            None => return false,
        };
        let key = match (&entry.handles, kind) {
            (Some(handles), TimerKind::Tick) => handles.tick.clone(),
            (Some(handles), TimerKind::Expiry) => handles.expiry.clone(),
            (None, _) => return false,
        };
        let expired = queue.remove(&key);
        let deadline = expired.deadline();
        entry.fire(queue, expired.into_inner(), deadline, self.breathing.tick_interval)
    }

    /// Deliver a timer to its session as if the queue had just yielded it.
    #[cfg(test)]
    fn deliver(&self, timer: Timer) -> bool {
        let mut timers = self.timers();
        let Timers { queue, entries } = &mut *timers;
        match entries.get_mut(&timer.chat_id) {
            Some(entry) => entry.fire(queue, timer, Instant::now(), self.breathing.tick_interval),
            None => false,
        }
    }

    /// Return the number of timers in the queue, including ones left to be dropped.
    #[cfg(test)]
    fn queued(&self) -> usize {
        self.timers().queue.len()
    }

    fn timers(&self) -> MutexGuard<'_, Timers> {
        // Every mutation leaves the timers consistent, so a poisoned lock is still usable.
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::phase::Phase;
    use super::*;

    const CHAT: chat::Id = chat::Id(42);

    fn state() -> State {
        State::new(
            BreathingConfig::default(),
            Companion::new(Duration::from_millis(0)),
        )
    }

    fn tick(state: &State, ticks: usize) {
        for _ in 0..ticks {
            state.expire_now(CHAT, TimerKind::Tick);
        }
    }

    #[tokio::test]
    async fn start_arms_both_timers() {
        let state = state();
        assert_eq!(state.pending_timers(CHAT), 0);
        assert_eq!(state.start_breathing(CHAT), Start::Started);
        let snapshot = *state.subscribe(CHAT).borrow();
        assert!(snapshot.active);
        assert_eq!(snapshot.run, 1);
        assert_eq!(snapshot.phase, Phase::Inhale);
        assert_eq!(snapshot.progress, 0);
        assert_eq!(state.pending_timers(CHAT), 2);
    }

    #[tokio::test]
    async fn ticks_follow_the_cycle() {
        let state = state();
        state.start_breathing(CHAT);

        tick(&state, 20);
        let snapshot = state.snapshot(CHAT);
        assert_eq!((snapshot.phase, snapshot.progress), (Phase::Hold, 0));
        assert_eq!(snapshot.ticks, 20);

        tick(&state, 7);
        let snapshot = state.snapshot(CHAT);
        assert_eq!((snapshot.phase, snapshot.progress), (Phase::Hold, 35));

        tick(&state, 13);
        let snapshot = state.snapshot(CHAT);
        assert_eq!((snapshot.phase, snapshot.progress), (Phase::Exhale, 0));

        // Every tick re-arms the periodic timer.
        assert_eq!(state.pending_timers(CHAT), 2);
    }

    #[tokio::test]
    async fn stop_releases_timers_and_is_idempotent() {
        let state = state();
        state.start_breathing(CHAT);
        tick(&state, 3);
        assert!(state.stop_breathing(CHAT));
        assert_eq!(state.pending_timers(CHAT), 0);
        let once = state.snapshot(CHAT);
        assert!(!once.active);

        assert!(!state.stop_breathing(CHAT));
        assert_eq!(state.snapshot(CHAT), once);
        assert_eq!(state.pending_timers(CHAT), 0);
    }

    #[tokio::test]
    async fn no_ticks_after_stop() {
        let state = state();
        state.start_breathing(CHAT);
        tick(&state, 5);
        state.stop_breathing(CHAT);
        let stopped = state.snapshot(CHAT);

        assert!(!state.expire_now(CHAT, TimerKind::Tick));
        assert_eq!(state.snapshot(CHAT), stopped);
    }

    #[tokio::test]
    async fn stopping_unknown_chat_is_a_no_op() {
        let state = state();
        assert!(!state.stop_breathing(CHAT));
        assert_eq!(state.snapshot(CHAT), Snapshot::default());
    }

    #[tokio::test]
    async fn expiry_ends_the_session_like_a_stop() {
        let expired = state();
        expired.start_breathing(CHAT);
        tick(&expired, 600);
        assert!(expired.snapshot(CHAT).active);
        assert!(expired.expire_now(CHAT, TimerKind::Expiry));
        assert_eq!(expired.pending_timers(CHAT), 0);

        let stopped = state();
        stopped.start_breathing(CHAT);
        stopped.stop_breathing(CHAT);

        let (expired, stopped) = (expired.snapshot(CHAT), stopped.snapshot(CHAT));
        assert!(!expired.active);
        assert_eq!(
            (expired.run, expired.active, expired.phase, expired.progress),
            (stopped.run, stopped.active, stopped.phase, stopped.progress)
        );
    }

    #[tokio::test]
    async fn restart_keeps_the_run() {
        let state = state();
        state.start_breathing(CHAT);
        tick(&state, 25);
        assert_eq!(state.start_breathing(CHAT), Start::Restarted);
        let snapshot = state.snapshot(CHAT);
        assert_eq!(snapshot.run, 1);
        assert!(snapshot.active);
        assert_eq!((snapshot.phase, snapshot.progress, snapshot.ticks), (Phase::Inhale, 0, 0));
        assert_eq!(state.pending_timers(CHAT), 2);

        state.stop_breathing(CHAT);
        assert_eq!(state.start_breathing(CHAT), Start::Started);
        assert_eq!(state.snapshot(CHAT).run, 2);
    }

    #[tokio::test]
    async fn sessions_are_per_chat() {
        let state = state();
        let other = chat::Id(7);
        state.start_breathing(CHAT);
        state.start_breathing(other);
        state.stop_breathing(other);
        assert!(state.snapshot(CHAT).active);
        assert!(!state.snapshot(other).active);
        assert_eq!(state.pending_timers(CHAT), 2);
        assert_eq!(state.pending_timers(other), 0);
    }

    #[tokio::test]
    async fn shutdown_stops_everything() {
        let state = state();
        state.start_breathing(CHAT);
        state.start_breathing(chat::Id(7));
        assert_eq!(state.shutdown(), 2);
        assert_eq!(state.pending_timers(CHAT), 0);
        assert_eq!(state.pending_timers(chat::Id(7)), 0);
        assert_eq!(state.shutdown(), 0);
    }

    #[tokio::test]
    async fn subscribers_follow_the_session() {
        let state = state();
        let mut updates = state.subscribe(CHAT);
        state.start_breathing(CHAT);
        tick(&state, 20);

        let latest = updates.recv().await.unwrap();
        assert_eq!(latest.phase, Phase::Hold);
        assert!(latest.active);

        state.stop_breathing(CHAT);
        let latest = updates.recv().await.unwrap();
        assert!(!latest.active);
    }

    #[tokio::test]
    async fn expiry_leaves_a_tick_due_at_the_same_instant() {
        time::pause();
        let state = state();
        state.start_breathing(CHAT);
        // The last tick of the session falls on the expiry deadline.
        tick(&state, 599);
        assert_eq!(state.queued(), 2);
        time::advance(BreathingConfig::default().session_length).await;

        assert!(state.expire_now(CHAT, TimerKind::Expiry));
        let snapshot = state.snapshot(CHAT);
        assert!(!snapshot.active);
        assert_eq!(snapshot.ticks, 599);
        assert_eq!(state.pending_timers(CHAT), 0);
        // The due tick stays queued and is dropped when it fires.
        assert_eq!(state.queued(), 1);
        let due = Timer {
            chat_id: CHAT,
            kind: TimerKind::Tick,
            arming: 1,
        };
        assert!(!state.deliver(due));
        assert_eq!(state.snapshot(CHAT), snapshot);
    }

    #[tokio::test]
    async fn timers_of_an_earlier_arming_are_dropped() {
        let state = state();
        state.start_breathing(CHAT);
        tick(&state, 3);
        state.stop_breathing(CHAT);
        state.start_breathing(CHAT);

        for kind in [TimerKind::Tick, TimerKind::Expiry].iter().copied() {
            let stale = Timer {
                chat_id: CHAT,
                kind,
                arming: 1,
            };
            assert!(!state.deliver(stale));
        }
        let snapshot = state.snapshot(CHAT);
        assert!(snapshot.active);
        assert_eq!(snapshot.ticks, 0);
        assert_eq!(state.pending_timers(CHAT), 2);
    }

    #[tokio::test]
    async fn stopping_releases_due_timers_lazily() {
        time::pause();
        let state = state();
        state.start_breathing(CHAT);
        time::advance(BreathingConfig::default().tick_interval).await;

        // The tick is due, only the expiry can be taken out right away.
        assert!(state.stop_breathing(CHAT));
        assert_eq!(state.pending_timers(CHAT), 0);
        assert_eq!(state.queued(), 1);

        state.start_breathing(CHAT);
        let due = Timer {
            chat_id: CHAT,
            kind: TimerKind::Tick,
            arming: 1,
        };
        assert!(!state.deliver(due));
        assert_eq!(state.snapshot(CHAT).ticks, 0);
    }
}
