use core::time::Duration;

use rand::{seq::SliceRandom, Rng};
use tokio::time::delay_for;

/// The companion's canned replies. One of them is picked at random for every message.
pub(crate) const REPLIES: [&str; 5] = [
    "I hear you, and I want you to know that your feelings are completely valid. \
     Many students experience similar challenges.",
    "Thank you for sharing that with me. It takes courage to open up about how you're feeling.",
    "I understand this might be difficult to talk about. \
     Would you like to explore some coping strategies that might help?",
    "You're not alone in feeling this way. \
     Many young people in India face similar pressures and worries.",
    "I appreciate you trusting me with this. \
     Let's work together to find ways to support your mental wellbeing.",
];

pub(crate) const GREETING: &str = "Hello! I'm here to listen and support you.\n\
    What would you like to talk about today?\n\n\
    Your conversation is private and anonymous.";

/// Conversation starters offered below the greeting.
///
/// The buttons in `markup::inline::QUICK_PROMPTS` refer to these by index, so both lists keep
/// the same order.
pub(crate) const QUICK_PROMPTS: [&str; 4] = [
    "I'm feeling stressed about studies",
    "I've been feeling anxious lately",
    "I'm struggling with relationships",
    "I need help with my mood",
];

/// A simulated chat companion.
///
/// There is no model behind it: after an artificial delay it answers with one of `REPLIES`.
#[derive(Debug, Clone)]
pub(crate) struct Companion {
    delay: Duration,
}

impl Companion {
    pub(crate) fn new(delay: Duration) -> Self {
        Companion { delay }
    }

    /// Answer a message from the user.
    ///
    /// Returns `None` for blank messages, which are not answered.
    pub(crate) async fn reply(&self, message: &str) -> Option<&'static str> {
        if message.trim().is_empty() {
            return None;
        }
        delay_for(self.delay).await;
        Some(pick(&mut rand::thread_rng()))
    }
}

/// Return the message of a quick prompt.
pub(crate) fn quick_prompt(index: usize) -> Option<&'static str> {
    QUICK_PROMPTS.get(index).copied()
}

fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    REPLIES.choose(rng).copied().unwrap_or(REPLIES[0])
}
