use std::sync::Arc;

use tbot::{
    types::{chat, keyboard::inline::Keyboard, Message},
    Bot,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    companion::GREETING,
    config::BreathingConfig,
    content,
    journal::JournalError,
    markup::inline,
    state::{session::Snapshot, Start, State},
    time, view,
};

/// Start a breathing exercise in a chat.
///
/// A fresh session gets its own message, which a renderer task keeps up to date until the
/// session ends. Restarting a running session reuses the message that is already shown.
pub(crate) async fn start_breathing(bot: &Bot, state: Arc<State>, chat_id: chat::Id) {
    if state.start_breathing(chat_id) == Start::Restarted {
        send_text(bot, chat_id, "Starting over from the top. Breathe in…").await;
        return;
    }

    let updates = state.subscribe(chat_id);
    let snapshot = *updates.borrow();
    let text = view::render(&snapshot, state.breathing());
    match bot
        .send_message(chat_id, text.as_str())
        .reply_markup(Keyboard::new(inline::BREATHING))
        .call()
        .await
    {
        Ok(message) => {
            tokio::spawn(render_breathing(
                bot.clone(),
                message,
                updates,
                snapshot,
                state.breathing().clone(),
            ));
        }
        Err(err) => {
            warn!(chat = %chat_id, error = %err, "could not show the breathing exercise");
            state.stop_breathing(chat_id);
        }
    }
}

/// Stop the breathing exercise in a chat.
pub(crate) async fn stop_breathing(bot: &Bot, state: Arc<State>, chat_id: chat::Id) {
    if !state.stop_breathing(chat_id) {
        send_text(bot, chat_id, "There is no breathing exercise running.").await;
    }
}

/// Keep the breathing message in sync with its session.
///
/// Re-renders only when the phase changes or progress crosses a render step, and ends once the
/// session it was started for is over.
async fn render_breathing(
    bot: Bot,
    message: Message,
    mut updates: watch::Receiver<Snapshot>,
    initial: Snapshot,
    config: BreathingConfig,
) {
    let mut rendered = view::render_key(&initial, config.render_step);
    while let Some(snapshot) = updates.recv().await {
        if !snapshot.active || snapshot.run != initial.run {
            break;
        }
        let key = view::render_key(&snapshot, config.render_step);
        if key == rendered {
            continue;
        }
        rendered = key;

        let text = view::render(&snapshot, &config);
        if let Err(err) = bot
            .edit_message_text(message.chat.id, message.id, text.as_str())
            .reply_markup(Keyboard::new(inline::BREATHING))
            .call()
            .await
        {
            debug!(chat = %message.chat.id, error = %err, "could not update the breathing exercise");
        }
    }

    let text = view::render_finished();
    if let Err(err) = bot
        .edit_message_text(message.chat.id, message.id, text.as_str())
        .reply_markup(Keyboard::new(inline::BREATHE_AGAIN))
        .call()
        .await
    {
        warn!(chat = %message.chat.id, error = %err, "could not close the breathing exercise");
    }
}

/// Answer a message with the companion.
///
/// A placeholder is shown while the companion is "thinking" and replaced by the answer.
pub(crate) async fn answer(bot: &Bot, state: Arc<State>, chat_id: chat::Id, text: &str) {
    if text.trim().is_empty() {
        return;
    }

    let placeholder = match bot.send_message(chat_id, "…").call().await {
        Ok(message) => message,
        Err(err) => {
            warn!(chat = %chat_id, error = %err, "could not send the placeholder");
            return;
        }
    };

    let reply = match state.companion.reply(text).await {
        Some(reply) => reply,
        None => return,
    };

    if let Err(err) = bot
        .edit_message_text(chat_id, placeholder.id, reply)
        .reply_markup(Keyboard::new(inline::REPLY))
        .call()
        .await
    {
        warn!(chat = %chat_id, error = %err, "could not deliver the reply");
    }
}

/// Greet the user and offer conversation starters.
pub(crate) async fn send_greeting(bot: &Bot, chat_id: chat::Id) {
    if let Err(err) = bot
        .send_message(chat_id, GREETING)
        .reply_markup(Keyboard::new(inline::QUICK_PROMPTS))
        .call()
        .await
    {
        warn!(chat = %chat_id, error = %err, "could not send the greeting");
    }
}

pub(crate) async fn send_resources(bot: &Bot, chat_id: chat::Id) {
    let text = content::resources_text();
    if let Err(err) = bot
        .send_message(chat_id, text.as_str())
        .reply_markup(Keyboard::new(inline::GOT_IT))
        .call()
        .await
    {
        warn!(chat = %chat_id, error = %err, "could not send the resources");
    }
}

pub(crate) async fn send_emergency_contacts(bot: &Bot, chat_id: chat::Id) {
    let text = content::emergency_text();
    if let Err(err) = bot
        .send_message(chat_id, text.as_str())
        .reply_markup(Keyboard::new(inline::EMERGENCY))
        .call()
        .await
    {
        warn!(chat = %chat_id, error = %err, "could not send the emergency contacts");
    }
}

/// Show the mood picker.
pub(crate) async fn send_mood_picker(bot: &Bot, state: Arc<State>, chat_id: chat::Id) {
    let text = match state.journal.current(chat_id) {
        Some(mood) => format!(
            "📓 Mood Journal\n\nYou're feeling {} {} today. Tap to change it, \
             or add a note with /note <text>.",
            mood.emoji(),
            mood.label()
        ),
        None => "📓 Mood Journal\n\nHow are you feeling today?".to_string(),
    };
    if let Err(err) = bot
        .send_message(chat_id, text.as_str())
        .reply_markup(Keyboard::new(inline::MOODS))
        .call()
        .await
    {
        warn!(chat = %chat_id, error = %err, "could not send the mood picker");
    }
}

/// Save a journal note and confirm it.
pub(crate) async fn save_note(bot: &Bot, state: Arc<State>, chat_id: chat::Id, note: &str) {
    let text = match state.journal.save(chat_id, note, chrono::Utc::now()) {
        Ok(entry) => format!(
            "Saved {} {}. Thank you for checking in with yourself.",
            entry.mood.emoji(),
            entry.mood.label()
        ),
        Err(JournalError::EmptyNote) => "Usage: /note <how your day went>".to_string(),
        Err(err) => format!("Please {}.", err),
    };
    send_text(bot, chat_id, &text).await;
}

/// Number of journal entries listed by `/journal`.
const JOURNAL_PAGE: usize = 10;

pub(crate) async fn send_journal(bot: &Bot, state: Arc<State>, chat_id: chat::Id) {
    let entries = state.journal.recent(chat_id, JOURNAL_PAGE);
    let text = if entries.is_empty() {
        "Your journal is empty. Pick a mood with /mood and add a note with /note <text>."
            .to_string()
    } else {
        let mut text = String::from("📓 Your recent entries\n");
        for entry in entries.iter() {
            text.push_str(&format!(
                "\n{} {} · {}\n{}\n",
                entry.mood.emoji(),
                entry.mood.label(),
                time::as_day_hh_mm(&entry.recorded_at),
                entry.note
            ));
        }
        text
    };
    send_text(bot, chat_id, &text).await;
}

/// Thank the user for their feedback. Feedback is logged, not stored.
pub(crate) async fn receive_feedback(bot: &Bot, chat_id: chat::Id, feedback: &str) {
    let feedback = feedback.trim();
    if feedback.is_empty() {
        send_text(bot, chat_id, "Usage: /feedback <how can we improve your experience?>").await;
        return;
    }
    info!(chat = %chat_id, feedback, "feedback received");
    send_text(bot, chat_id, "Thank you for your feedback! 💜").await;
}

/// Display information on usage
pub(crate) async fn send_help_text(bot: &Bot, chat_id: chat::Id) {
    if let Err(err_msg) = bot
        .send_message(
            chat_id,
            "\
Mind Bloom, your safe space for mental wellness.

Commands:
/breathe - Start a two minute breathing exercise.
/stop - End the breathing exercise.
/talk - Talk to the companion. Any other message works too.
/resources - Wellness resources and daily tips.
/mood - Log how you're feeling.
/note - Add a note to your mood journal.
/journal - Show your recent journal entries.
/emergency - Helplines for immediate support.
/feedback - Tell us how we can improve.
/help - Show this help message.

Your conversations are private. Journal entries live in memory only and are gone after a restart.",
        )
        .reply_markup(Keyboard::new(inline::GOT_IT))
        .call()
        .await
    {
        warn!(chat = %chat_id, error = %err_msg, "could not send the help text");
    }
}

async fn send_text(bot: &Bot, chat_id: chat::Id, text: &str) {
    if let Err(err) = bot.send_message(chat_id, text).call().await {
        warn!(chat = %chat_id, error = %err, "could not send message");
    }
}
