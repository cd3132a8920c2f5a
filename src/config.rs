use core::time::Duration;
use std::env;

use thiserror::Error;

/// Errors raised while reading the configuration from the environment.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {name} has invalid value {value:?}: expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Timing of the breathing exercise.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BreathingConfig {
    /// Interval between two ticks
    pub(crate) tick_interval: Duration,
    /// Wall-clock length of a session before it expires on its own
    pub(crate) session_length: Duration,
    /// Progress granularity at which the breathing message is re-rendered
    pub(crate) render_step: u8,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        BreathingConfig {
            tick_interval: Duration::from_millis(200),
            session_length: Duration::from_secs(120),
            render_step: 25,
        }
    }
}

/// The bot's configuration, read once at startup.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) bot_token: String,
    pub(crate) breathing: BreathingConfig,
    /// Artificial delay before the companion answers
    pub(crate) reply_delay: Duration,
}

impl Config {
    /// Read the configuration from the process environment.
    pub(crate) fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to their defaults, except `BOT_TOKEN`.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let defaults = BreathingConfig::default();
        let breathing = BreathingConfig {
            tick_interval: millis(&lookup, "BREATHING_TICK_MS")?.unwrap_or(defaults.tick_interval),
            session_length: number(&lookup, "BREATHING_SESSION_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_length),
            render_step: render_step(&lookup)?.unwrap_or(defaults.render_step),
        };

        let reply_delay =
            millis(&lookup, "COMPANION_REPLY_DELAY_MS")?.unwrap_or(Duration::from_millis(1500));

        Ok(Config {
            bot_token,
            breathing,
            reply_delay,
        })
    }
}

/// Parse a positive integer variable.
fn number<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(number) if number > 0 => Ok(Some(number)),
            _ => Err(ConfigError::Invalid {
                name,
                value,
                expected: "a positive integer",
            }),
        },
    }
}

fn millis<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(number(lookup, name)?.map(Duration::from_millis))
}

/// The render step has to divide 100 so every phase boundary is a render point.
fn render_step<F>(lookup: &F) -> Result<Option<u8>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    const NAME: &str = "BREATHING_RENDER_STEP";
    match number(lookup, NAME)? {
        None => Ok(None),
        Some(step) if step <= 100 && 100 % step == 0 => Ok(Some(step as u8)),
        Some(step) => Err(ConfigError::Invalid {
            name: NAME,
            value: step.to_string(),
            expected: "a divisor of 100",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn token_is_required() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("BOT_TOKEN"));
        assert_eq!(
            config(&[("BOT_TOKEN", "  ")]).unwrap_err(),
            ConfigError::Missing("BOT_TOKEN")
        );
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.breathing, BreathingConfig::default());
        assert_eq!(config.breathing.tick_interval, Duration::from_millis(200));
        assert_eq!(config.breathing.session_length, Duration::from_secs(120));
        assert_eq!(config.reply_delay, Duration::from_millis(1500));
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("BOT_TOKEN", "123:abc"),
            ("BREATHING_TICK_MS", "100"),
            ("BREATHING_SESSION_SECS", "60"),
            ("BREATHING_RENDER_STEP", "20"),
            ("COMPANION_REPLY_DELAY_MS", "0500"),
        ])
        .unwrap();
        assert_eq!(config.breathing.tick_interval, Duration::from_millis(100));
        assert_eq!(config.breathing.session_length, Duration::from_secs(60));
        assert_eq!(config.breathing.render_step, 20);
        assert_eq!(config.reply_delay, Duration::from_millis(500));
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = config(&[("BOT_TOKEN", "t"), ("BREATHING_TICK_MS", "fast")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "BREATHING_TICK_MS",
                value: "fast".to_string(),
                expected: "a positive integer",
            }
        );
        assert!(config(&[("BOT_TOKEN", "t"), ("BREATHING_SESSION_SECS", "0")]).is_err());
    }

    #[test]
    fn render_step_must_divide_hundred() {
        let err = config(&[("BOT_TOKEN", "t"), ("BREATHING_RENDER_STEP", "30")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "BREATHING_RENDER_STEP",
                value: "30".to_string(),
                expected: "a divisor of 100",
            }
        );
    }
}
