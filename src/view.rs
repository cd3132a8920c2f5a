//! Rendering of the breathing exercise.
//!
//! The message shows a bar standing in for the expanding and contracting circle, the phase
//! label and the time left.

use crate::{
    config::BreathingConfig,
    state::{phase::Phase, session::Snapshot},
    time,
};

/// Number of cells in the progress bar.
const BAR_WIDTH: usize = 10;

/// Return how full the breathing circle is, in percent.
///
/// The circle fills while breathing in, stays full while holding and empties while breathing
/// out.
pub(crate) fn fill_percent(snapshot: &Snapshot) -> u8 {
    match snapshot.phase {
        Phase::Inhale => snapshot.progress,
        Phase::Hold => 100,
        Phase::Exhale => 100 - snapshot.progress,
    }
}

pub(crate) fn label(phase: Phase) -> &'static str {
    match phase {
        Phase::Inhale => "Breathe In",
        Phase::Hold => "Hold",
        Phase::Exhale => "Breathe Out",
    }
}

/// Return a bar of `BAR_WIDTH` cells filled to `percent`.
pub(crate) fn progress_bar(percent: u8) -> String {
    let filled = (usize::from(percent.min(100)) * BAR_WIDTH + 50) / 100;
    let mut bar = "🔵".repeat(filled);
    bar.push_str(&"⚪".repeat(BAR_WIDTH - filled));
    bar
}

/// Key deciding whether a snapshot needs a new render.
///
/// Snapshots with the same key look the same at `render_step` granularity.
pub(crate) fn render_key(snapshot: &Snapshot, render_step: u8) -> (Phase, u8) {
    (snapshot.phase, snapshot.progress / render_step.max(1))
}

/// Text of a running breathing exercise.
pub(crate) fn render(snapshot: &Snapshot, config: &BreathingConfig) -> String {
    format!(
        "🌬 Breathing Exercise\n\n\
         {}\n\
         {}\n\n\
         Breathe in as the circle fills, hold when it's full, breathe out as it empties.\n\n\
         ⏱ {} left",
        progress_bar(fill_percent(snapshot)),
        label(snapshot.phase),
        time::as_m_ss(time::remaining(config, snapshot.ticks)),
    )
}

/// Text replacing the exercise once it's over.
pub(crate) fn render_finished() -> String {
    "🌬 Breathing Exercise\n\nWell done! Take a moment to notice how you feel.".to_string()
}
