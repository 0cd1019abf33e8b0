//! Shared embed builders

use crate::bot::{Context, Data};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use spoobot_config::UiColors;
use std::time::Duration;

/// Resolve a configured embed color
pub fn color(data: &Data, pick: impl Fn(&UiColors) -> &String) -> u32 {
    UiColors::parse(pick(&data.config.ui.colors))
}

/// Standard "Requested by ..." footer with the author's avatar
pub fn requested_by(ctx: &Context<'_>) -> serenity::CreateEmbedFooter {
    serenity::CreateEmbedFooter::new(format!("Requested by {}", ctx.author().name))
        .icon_url(ctx.author().face())
}

/// Cooldown rejection embed: retry timestamp plus a humanized wait and a
/// waiting gif
pub fn cooldown_embed(ctx: &Context<'_>, retry_after: Duration) -> serenity::CreateEmbed {
    let data = ctx.data();
    let resume_at = Utc::now() + chrono::Duration::seconds(retry_after.as_secs() as i64);

    let gifs = &data.config.ui.waiting_gifs;
    let gif = &gifs[fastrand::usize(..gifs.len())];

    serenity::CreateEmbed::new()
        .title("⏳ Cooldown")
        .description(format!(
            "You have to wait until **<t:{}>** ({}) to use this command again.",
            resume_at.timestamp(),
            humanize(retry_after)
        ))
        .color(color(data, |c| &c.error))
        .image(gif)
        .footer(requested_by(ctx))
}

/// Generic command failure embed
pub fn command_error_embed(
    ctx: &Context<'_>,
    error: &str,
    command_name: &str,
) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("An error occurred")
        .description(format!("```{}```", error))
        .color(color(ctx.data(), |c| &c.error))
        .footer(
            serenity::CreateEmbedFooter::new(format!(
                "{} used /{}",
                ctx.author().name,
                command_name
            ))
            .icon_url(ctx.author().face()),
        )
        .timestamp(serenity::Timestamp::now())
}

/// Render a duration as the largest whole units a user would say
pub fn humanize(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, plural(hours)));
    }
    if minutes > 0 {
        parts.push(format!("{} minute{}", minutes, plural(minutes)));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{} second{}", seconds, plural(seconds)));
    }
    parts.join(" ")
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_seconds() {
        assert_eq!(humanize(Duration::from_secs(5)), "5 seconds");
        assert_eq!(humanize(Duration::from_secs(1)), "1 second");
        assert_eq!(humanize(Duration::ZERO), "0 seconds");
    }

    #[test]
    fn test_humanize_compound() {
        assert_eq!(humanize(Duration::from_secs(65)), "1 minute 5 seconds");
        assert_eq!(
            humanize(Duration::from_secs(3600 + 120 + 3)),
            "1 hour 2 minutes 3 seconds"
        );
        assert_eq!(humanize(Duration::from_secs(7200)), "2 hours");
    }
}
