use super::phase::Phase;

/// Percentage points a single tick adds to the progress of the current phase.
pub(crate) const PROGRESS_STEP: u8 = 5;

/// Progress value at which a phase is complete.
pub(crate) const PROGRESS_FULL: u8 = 100;

/// A guided breathing session.
///
/// A session is either idle or running through the breathing cycle. While running, every tick
/// moves `progress` forward by `PROGRESS_STEP`. Once `progress` reaches `PROGRESS_FULL` it wraps
/// back to zero and the phase advances, so every phase lasts exactly 20 ticks.
///
/// The session itself knows nothing about time. Ticks and the expiry are delivered by the
/// `State` that owns it.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub(crate) enum BreathingSession {
    /// No exercise is running
    Idle,
    /// An exercise is running
    Running { phase: Phase, progress: u8 },
}

impl Default for BreathingSession {
    fn default() -> Self {
        BreathingSession::Idle
    }
}

impl BreathingSession {
    /// Start the exercise from the beginning of the cycle.
    ///
    /// Starting a running session resets it to `Inhale` at zero progress.
    pub(crate) fn start(&mut self) {
        *self = BreathingSession::Running {
            phase: Phase::Inhale,
            progress: 0,
        };
    }

    /// Advance the session by one tick.
    ///
    /// Returns true if the session changed. A tick delivered to an idle session has no effect.
    pub(crate) fn tick(&mut self) -> bool {
        match self {
            BreathingSession::Idle => false,
            BreathingSession::Running { phase, progress } => {
                let next = *progress + PROGRESS_STEP;
                if next >= PROGRESS_FULL {
                    *progress = 0;
                    *phase = phase.next();
                } else {
                    *progress = next;
                }
                true
            }
        }
    }

    /// Stop the exercise.
    ///
    /// Returns true if the session was running.
    pub(crate) fn stop(&mut self) -> bool {
        let was_running = self.is_active();
        *self = BreathingSession::Idle;
        was_running
    }

    /// Return true if the exercise is running.
    pub(crate) fn is_active(&self) -> bool {
        matches!(self, BreathingSession::Running { .. })
    }

    pub(crate) fn phase(&self) -> Phase {
        match self {
            BreathingSession::Running { phase, .. } => *phase,
            BreathingSession::Idle => Phase::Inhale,
        }
    }

    pub(crate) fn progress(&self) -> u8 {
        match self {
            BreathingSession::Running { progress, .. } => *progress,
            BreathingSession::Idle => 0,
        }
    }
}

/// Read-only view of a session, published to subscribers after every change.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub(crate) struct Snapshot {
    /// Generation of the session. Bumped every time an idle session is started.
    pub(crate) run: u64,
    /// Ticks delivered since the session was last (re)started.
    pub(crate) ticks: u32,
    pub(crate) active: bool,
    pub(crate) phase: Phase,
    pub(crate) progress: u8,
}

impl Snapshot {
    pub(crate) fn of(run: u64, ticks: u32, session: &BreathingSession) -> Snapshot {
        Snapshot {
            run,
            ticks,
            active: session.is_active(),
            phase: session.phase(),
            progress: session.progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(phase: Phase, progress: u8) -> BreathingSession {
        BreathingSession::Running { phase, progress }
    }

    fn started() -> BreathingSession {
        let mut session = BreathingSession::default();
        session.start();
        session
    }

    #[test]
    fn starts_idle() {
        let session = BreathingSession::default();
        assert_eq!(session, BreathingSession::Idle);
        assert!(!session.is_active());
    }

    #[test]
    fn start_begins_with_inhale() {
        assert_eq!(started(), running(Phase::Inhale, 0));
    }

    #[test]
    fn progress_follows_tick_count() {
        let mut session = started();
        for k in 1..=200u32 {
            session.tick();
            assert_eq!(u32::from(session.progress()), (5 * k) % 100, "after {} ticks", k);
        }
    }

    #[test]
    fn every_twentieth_tick_advances_phase() {
        let mut session = started();
        let mut phase = session.phase();
        for k in 1..=120u32 {
            session.tick();
            if k % 20 == 0 {
                assert_eq!(session.phase(), phase.next());
                assert_eq!(session.progress(), 0);
                phase = session.phase();
            } else {
                assert_eq!(session.phase(), phase);
            }
        }
    }

    #[test]
    fn one_full_cycle_takes_sixty_ticks() {
        fn after(ticks: usize, session: &mut BreathingSession) -> BreathingSession {
            for _ in 0..ticks {
                session.tick();
            }
            *session
        }

        let mut session = started();
        assert_eq!(after(20, &mut session), running(Phase::Hold, 0));
        assert_eq!(after(20, &mut session), running(Phase::Exhale, 0));
        assert_eq!(after(20, &mut session), running(Phase::Inhale, 0));
    }

    #[test]
    fn progress_never_leaves_range() {
        let mut session = started();
        for _ in 0..600 {
            session.tick();
            assert!(session.progress() < PROGRESS_FULL);
        }
    }

    #[test]
    fn tick_after_stop_has_no_effect() {
        let mut session = started();
        assert!(session.stop());
        assert!(!session.tick());
        assert_eq!(session, BreathingSession::Idle);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut once = started();
        once.tick();
        once.stop();

        let mut twice = started();
        twice.tick();
        twice.stop();
        assert!(!twice.stop());

        assert_eq!(once, twice);
    }

    #[test]
    fn restart_resets_cycle() {
        let mut session = started();
        for _ in 0..27 {
            session.tick();
        }
        assert_eq!(session, running(Phase::Hold, 35));
        session.start();
        assert_eq!(session, running(Phase::Inhale, 0));
    }

    #[test]
    fn snapshot_of_idle_session() {
        let snapshot = Snapshot::of(3, 0, &BreathingSession::Idle);
        assert_eq!(
            snapshot,
            Snapshot {
                run: 3,
                ticks: 0,
                active: false,
                phase: Phase::Inhale,
                progress: 0
            }
        );
    }
}
