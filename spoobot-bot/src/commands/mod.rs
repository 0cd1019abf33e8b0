//! Slash command implementations

pub mod getcode;
pub mod misc;
pub mod shorten;
pub mod stats;

use crate::bot::{Data, Error};

/// Every command the framework registers
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        shorten::shorten(),
        shorten::emojify(),
        stats::stats(),
        getcode::get_code(),
        misc::help(),
        misc::about(),
        misc::invite(),
        misc::support(),
        misc::bot_stats(),
        misc::ping(),
    ]
}
