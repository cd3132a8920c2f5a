use futures_util::future;
use tbot::Bot;
use thiserror::Error;
use tokio::{select, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bot::{callback, command};
use config::{Config, ConfigError};
use state::State;

use state::periodic;

mod bot;
mod companion;
mod config;
mod content;
mod journal;
pub(crate) mod markup;
mod state;
mod time;
mod view;

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("polling for updates failed: {0}")]
    Polling(String),
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mind_bloom=info")),
        )
        .init();

    let config = Config::from_env()?;
    let bot = Bot::new(config.bot_token.clone());
    let mut event_loop = bot.clone().stateful_event_loop(State::from_config(&config));

    // Fetch the bot's username
    if let Err(err) = event_loop.fetch_username().await {
        warn!(error = %err, "could not fetch the bot's username");
    }

    // Register bot commands
    event_loop.start(command::start);
    event_loop.help(command::help);
    event_loop.command("breathe", command::breathe);
    event_loop.command("stop", command::stop);
    event_loop.command("talk", command::talk);
    event_loop.command("resources", command::resources);
    event_loop.command("emergency", command::emergency);
    event_loop.command("mood", command::mood);
    event_loop.command("note", command::note);
    event_loop.command("journal", command::journal);
    event_loop.command("feedback", command::feedback);
    event_loop.text(command::text);
    event_loop.data_callback(callback::data_callback);

    // The task delivering breathing ticks and expiries
    let state = event_loop.get_state();
    tokio::spawn(periodic::poll_for_expired_timers(state.clone()));

    info!(
        tick_ms = config.breathing.tick_interval.as_millis() as u64,
        session_secs = config.breathing.session_length.as_secs(),
        "Mind Bloom is listening"
    );
    let outcome = select! {
        result = event_loop.polling().start() => {
            let Err(err) = result;
            Err(Error::Polling(format!("{:?}", err)))
        }
        _ = interrupted() => Ok(()),
    };

    let stopped = state.shutdown();
    info!(stopped, "shut down");
    outcome
}

/// Resolve once the process receives ctrl-c.
async fn interrupted() {
    match signal::ctrl_c().await {
        Ok(()) => info!("interrupted"),
        Err(err) => {
            warn!(error = %err, "could not listen for ctrl-c");
            future::pending::<()>().await
        }
    }
}
