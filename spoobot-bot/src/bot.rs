//! Shared bot state, framework error handling and gateway event handling

use crate::embeds;
use parking_lot::Mutex;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;
use spoobot_charts::RenderStack;
use spoobot_commands::{CooldownCheck, CooldownManager, RateWindow};
use spoobot_common::SpooClient;
use spoobot_config::Config;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Error type for commands
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Poise context type alias
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Rolling uptime and latency tracking
#[derive(Debug)]
pub struct BotStatus {
    started_at: Instant,
    /// Last ten command round-trip latencies in milliseconds
    latencies: Mutex<VecDeque<f64>>,
}

impl Default for BotStatus {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            latencies: Mutex::new(VecDeque::with_capacity(10)),
        }
    }
}

impl BotStatus {
    pub fn record_latency(&self, millis: f64) {
        let mut latencies = self.latencies.lock();
        if latencies.len() == 10 {
            latencies.pop_front();
        }
        latencies.push_back(millis);
    }

    pub fn average_latency(&self) -> Option<f64> {
        let latencies = self.latencies.lock();
        if latencies.is_empty() {
            return None;
        }
        Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Uptime as "H hours M minutes S seconds"
    pub fn uptime_display(&self) -> String {
        let total = self.uptime().as_secs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        format!("{} hours {} minutes {} seconds", hours, minutes, seconds)
    }
}

/// Shared application state accessible across commands and event handlers
pub struct Data {
    /// Application configuration
    pub config: Arc<Config>,
    /// spoo.me API client
    pub spoo: SpooClient,
    /// Chart/heatmap/export rendering stack
    pub render_stack: Arc<RenderStack>,
    /// Multi-window command cooldowns
    pub cooldowns: Arc<CooldownManager>,
    /// Windows guarding the shorten/emojify commands
    pub shorten_windows: Vec<RateWindow>,
    /// Window guarding the stats command
    pub stats_windows: Vec<RateWindow>,
    /// Uptime and latency tracking
    pub status: BotStatus,
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &"<Config>")
            .field("spoo", &"<SpooClient>")
            .field("cooldowns", &self.cooldowns)
            .field("status", &self.status)
            .finish()
    }
}

/// Check the cooldown for a command, replying with the cooldown embed on
/// rejection. Returns whether the command may proceed.
pub async fn enforce_cooldown(
    ctx: &Context<'_>,
    command: &str,
    windows: &[RateWindow],
) -> Result<bool, Error> {
    let outcome = ctx
        .data()
        .cooldowns
        .check_and_record(command, ctx.author().id.get(), windows);

    match outcome {
        CooldownCheck::Admitted => Ok(true),
        CooldownCheck::Rejected { retry_after } => {
            let embed = embeds::cooldown_embed(ctx, retry_after);
            ctx.send(
                poise::CreateReply::default()
                    .embed(embed)
                    .ephemeral(true),
            )
            .await?;
            Ok(false)
        }
    }
}

/// Global error handler for the framework
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {:?}", ctx.command().name, error);
            let embed = embeds::command_error_embed(&ctx, &error.to_string(), &ctx.command().name);
            if let Err(e) = ctx
                .send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await
            {
                warn!("Failed to report command error: {}", e);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                "Error in event handler for {:?}: {:?}",
                event.snake_case_name(),
                error
            );
        }
        error => {
            error!("Other framework error: {:?}", error);
        }
    }
}

/// Gateway event handler: mention replies and member-join welcomes
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "Bot connected as {} (ID: {})",
                data_about_bot.user.name, data_about_bot.user.id
            );
            info!("Connected to {} guilds", data_about_bot.guilds.len());
        }
        serenity::FullEvent::Message { new_message } => {
            handle_mention(ctx, new_message, data).await?;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            handle_member_join(ctx, new_member, data).await?;
        }
        _ => {}
    }
    Ok(())
}

/// Reply with a pointer to /help when the bot itself is mentioned
async fn handle_mention(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }

    let me = ctx.cache.current_user().id;
    let mentioned = message.mentions.iter().any(|user| user.id == me);
    if !mentioned || message.kind == serenity::MessageType::InlineReply {
        return Ok(());
    }

    let description = data
        .config
        .ui
        .messages
        .bot_mention
        .replace("{help}", "/help");

    let embed = serenity::CreateEmbed::new()
        .description(description)
        .color(embeds::color(data, |c| &c.primary));

    message
        .channel_id
        .send_message(
            &ctx.http,
            serenity::CreateMessage::new()
                .reference_message(message)
                .embed(embed),
        )
        .await?;
    Ok(())
}

/// Post a welcome embed when a member joins the support server
async fn handle_member_join(
    ctx: &serenity::Context,
    member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    let channel_id: u64 = match data.config.discord.welcome_channel_id.parse() {
        Ok(id) => id,
        Err(_) => {
            warn!("Welcome channel id is not numeric; skipping welcome message");
            return Ok(());
        }
    };

    let gifs = &data.config.ui.welcome_gifs;
    let gif = &gifs[fastrand::usize(..gifs.len())];

    let embed = serenity::CreateEmbed::new()
        .title("Welcome to the spoo.me Support Server!")
        .description(
            data.config
                .ui
                .messages
                .welcome
                .replace("{mention}", &member.mention().to_string()),
        )
        .color(embeds::color(data, |c| &c.primary))
        .url(&data.config.urls.website)
        .image(gif)
        .thumbnail(member.face());

    serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_window_is_capped_at_ten() {
        let status = BotStatus::default();
        for i in 0..15 {
            status.record_latency(i as f64);
        }
        // Only the last ten survive: 5..=14, averaging 9.5
        assert_eq!(status.average_latency(), Some(9.5));
    }

    #[test]
    fn test_average_latency_empty() {
        let status = BotStatus::default();
        assert_eq!(status.average_latency(), None);
    }

    #[test]
    fn test_uptime_display_format() {
        let status = BotStatus::default();
        let display = status.uptime_display();
        assert!(display.contains("hours"));
        assert!(display.contains("minutes"));
        assert!(display.contains("seconds"));
    }
}
