use std::sync::Arc;

use tbot::contexts::fields::Context;
use tbot::contexts::methods::ChatMethods;
use tbot::contexts::{Command, Text};

use tbot::types::keyboard::inline::Keyboard;
use tracing::warn;

use crate::bot::util;
use crate::markup::inline::START_MENU;
use crate::state::State;

/// Start command
///
/// Welcome the user and show the main menu.
pub(crate) async fn start(context: Arc<Command<Text>>, _state: Arc<State>) {
    let text = "🌸 Welcome to Mind Bloom, your safe space for mental wellness.\n\n\
                A confidential companion to support you through academic and social pressures.\n\
                Choose one of the following:";

    if let Err(err) = context
        .send_message(text)
        .reply_markup(Keyboard::new(START_MENU))
        .call()
        .await
    {
        warn!(chat = %context.chat.id, error = %err, "could not send the start menu");
    }
}

/// Command to display information on usage
pub(crate) async fn help(context: Arc<Command<Text>>, _state: Arc<State>) {
    util::send_help_text(context.bot(), context.chat.id).await
}

/// Command to start a breathing exercise
pub(crate) async fn breathe(context: Arc<Command<Text>>, state: Arc<State>) {
    util::start_breathing(context.bot(), state, context.chat.id).await
}

/// Command to end the running breathing exercise
pub(crate) async fn stop(context: Arc<Command<Text>>, state: Arc<State>) {
    util::stop_breathing(context.bot(), state, context.chat.id).await
}

/// Talk to the companion
///
/// Without a message, show the greeting and the conversation starters.
pub(crate) async fn talk(context: Arc<Command<Text>>, state: Arc<State>) {
    let message = context.text.value.trim();
    if message.is_empty() {
        util::send_greeting(context.bot(), context.chat.id).await
    } else {
        util::answer(context.bot(), state, context.chat.id, message).await
    }
}

pub(crate) async fn resources(context: Arc<Command<Text>>, _state: Arc<State>) {
    util::send_resources(context.bot(), context.chat.id).await
}

pub(crate) async fn emergency(context: Arc<Command<Text>>, _state: Arc<State>) {
    util::send_emergency_contacts(context.bot(), context.chat.id).await
}

pub(crate) async fn mood(context: Arc<Command<Text>>, state: Arc<State>) {
    util::send_mood_picker(context.bot(), state, context.chat.id).await
}

/// Add a note to the mood journal
pub(crate) async fn note(context: Arc<Command<Text>>, state: Arc<State>) {
    util::save_note(context.bot(), state, context.chat.id, &context.text.value).await
}

pub(crate) async fn journal(context: Arc<Command<Text>>, state: Arc<State>) {
    util::send_journal(context.bot(), state, context.chat.id).await
}

pub(crate) async fn feedback(context: Arc<Command<Text>>, _state: Arc<State>) {
    util::receive_feedback(context.bot(), context.chat.id, &context.text.value).await
}

/// Any other text message is a message to the companion
pub(crate) async fn text(context: Arc<Text>, state: Arc<State>) {
    if context.text.value.starts_with('/') {
        return;
    }
    util::answer(context.bot(), state, context.chat.id, &context.text.value).await
}
