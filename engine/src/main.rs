use anyhow::Context;
use clap::{Arg, Command};
use rand::{rngs::StdRng, SeedableRng};
use splitbet_engine::{display_code, Countdown, RoundController};
use splitbet_types::{RoomId, RoomSchedule};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{info, Level};

/// Watcher configuration (from config file).
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub log_level: String,
    /// Epoch start of round 0, per room, as unix milliseconds.
    pub room_epochs_ms: Vec<u64>,
    /// Room to watch.
    pub room: RoomId,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let matches = Command::new("splitbet-engine")
        .about("Watch the round clock of a splitbet room.")
        .arg(Arg::new("config").long("config").required(true))
        .get_matches();

    // Load from config file
    let config_file = matches.get_one::<String>("config").unwrap();
    let config_file =
        std::fs::read_to_string(config_file).context("could not read config file")?;
    let config: Config =
        serde_yaml::from_str(&config_file).context("could not parse config file")?;

    // Setup logging
    let level = Level::from_str(&config.log_level).context("invalid log level")?;
    tracing_subscriber::fmt().with_max_level(level).init();

    let epochs = config
        .room_epochs_ms
        .iter()
        .map(|ms| SystemTime::UNIX_EPOCH + Duration::from_millis(*ms))
        .collect();
    let schedule = RoomSchedule::new(epochs);
    let controller = Arc::new(RoundController::new(schedule)?);
    info!(
        room = config.room,
        number = controller.round_number(config.room)?,
        "watching room"
    );

    let mut countdown = Countdown::start(controller.clone(), config.room)?;
    let mut views = countdown.subscribe();
    let mut rng = StdRng::from_entropy();
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow().clone();
                info!(
                    number = view.round_number,
                    remaining_secs = view.remaining.as_secs(),
                    "tick"
                );
            }
            rollover = countdown.next_rollover() => {
                let Some(index) = rollover else {
                    break;
                };
                info!(
                    index,
                    number = controller.round_number(config.room)?,
                    code = display_code(&mut rng),
                    "round rolled over"
                );
            }
        }
    }

    Ok(())
}
