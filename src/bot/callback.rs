use std::sync::Arc;

use tbot::contexts::{fields::Context, DataCallback};
use tokio::join;
use tracing::{debug, info, warn};

use super::util;
use crate::{companion, journal::Mood, state::State};
use tbot::contexts::methods::Callback as OtherCallback;

/// Data callback handler
pub(crate) async fn data_callback(context: Arc<DataCallback>, state: Arc<State>) {
    match context.data.as_str() {
        "breathe" => breathe_pressed(context, state).await,
        "finish" => finish_pressed(context, state).await,
        "talk" => talk_pressed(context).await,
        "resources" => resources_pressed(context).await,
        "emergency" => emergency_pressed(context).await,
        "mood" => mood_pressed(context, state).await,
        "helpful" => helpful_pressed(context).await,
        "more" => more_pressed(context).await,
        "help" => help_pressed(context).await,
        "cancel" => cancel_button_pressed(context).await,
        data => {
            if let Some(label) = data.strip_prefix("mood:") {
                mood_selected(context.clone(), state, label).await
            } else if let Some(index) = data.strip_prefix("prompt:") {
                prompt_pressed(context.clone(), state, index).await
            } else {
                debug!(data, "received unhandled callback");
            }
        }
    }
}

async fn breathe_pressed(context: Arc<DataCallback>, state: Arc<State>) {
    if let Some(message) = context.origin.to_owned().message() {
        util::start_breathing(context.bot(), state, message.chat.id).await
    } else {
        debug!("Context is not from a Message.");
    }
}

async fn finish_pressed(context: Arc<DataCallback>, state: Arc<State>) {
    if let Some(message) = context.origin.to_owned().message() {
        let text = if state.stop_breathing(message.chat.id) {
            "Well done!"
        } else {
            "The exercise is already over."
        };
        notify(&context, text).await;
    } else {
        debug!("Context is not from a Message.");
    }
}

async fn talk_pressed(context: Arc<DataCallback>) {
    if let Some(message) = context.origin.to_owned().message() {
        join!(
            util::send_greeting(context.bot(), message.chat.id),
            notify(&context, "I'm listening.")
        );
    }
}

async fn resources_pressed(context: Arc<DataCallback>) {
    join!(delete_message(context.clone()), async {
        if let Some(message) = context.origin.to_owned().message() {
            util::send_resources(context.bot(), message.chat.id).await
        }
    });
}

async fn emergency_pressed(context: Arc<DataCallback>) {
    if let Some(message) = context.origin.to_owned().message() {
        util::send_emergency_contacts(context.bot(), message.chat.id).await
    }
}

async fn mood_pressed(context: Arc<DataCallback>, state: Arc<State>) {
    join!(delete_message(context.clone()), async {
        if let Some(message) = context.origin.to_owned().message() {
            util::send_mood_picker(context.bot(), state, message.chat.id).await
        }
    });
}

async fn mood_selected(context: Arc<DataCallback>, state: Arc<State>, label: &str) {
    let mood = match Mood::from_label(label) {
        Some(mood) => mood,
        None => {
            warn!(label, "unknown mood");
            return;
        }
    };
    if let Some(message) = context.origin.to_owned().message() {
        state.journal.select(message.chat.id, mood);
        let text = format!("Feeling {} {}. Add a note with /note <text>.", mood.emoji(), mood.label());
        notify(&context, &text).await;
    }
}

/// Send the message of a conversation starter to the companion
async fn prompt_pressed(context: Arc<DataCallback>, state: Arc<State>, index: &str) {
    let prompt = match index.parse().ok().and_then(companion::quick_prompt) {
        Some(prompt) => prompt,
        None => {
            warn!(index, "unknown quick prompt");
            return;
        }
    };
    if let Some(message) = context.origin.to_owned().message() {
        join!(
            notify(&context, prompt),
            util::answer(context.bot(), state, message.chat.id, prompt)
        );
    }
}

async fn helpful_pressed(context: Arc<DataCallback>) {
    info!("reply marked as helpful");
    notify(&context, "Thank you for letting me know! 💜").await;
}

async fn more_pressed(context: Arc<DataCallback>) {
    notify(&context, "Tell me more, I'm listening.").await;
}

async fn help_pressed(context: Arc<DataCallback>) {
    join!(delete_message(context.clone()), async {
        if let Some(message) = context.origin.to_owned().message() {
            util::send_help_text(context.bot(), message.chat.id).await;
        } else {
            debug!("Not a Message");
        }
    });
}

/// Delete the menu
async fn cancel_button_pressed(context: Arc<DataCallback>) {
    delete_message(context).await
}

/// Show a short notification to the user who pressed the button
async fn notify(context: &DataCallback, text: &str) {
    if let Err(err) = context.notify(text).call().await {
        debug!(error = %err, "could not answer the callback");
    }
}

/// Delete the Message associated with the DataCallback
async fn delete_message(context: Arc<DataCallback>) {
    match context.origin.to_owned().message() {
        Some(message) => {
            if let Err(err) = context
                .bot()
                .delete_message(message.chat.id, message.id)
                .call()
                .await
            {
                debug!(error = %err, "could not delete message");
            }
        }
        None => {
            debug!("Could not extract message.");
        }
    }
}
