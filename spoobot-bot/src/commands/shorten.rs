//! /shorten and /emojify commands

use crate::bot::{enforce_cooldown, Context, Error};
use crate::embeds;
use poise::serenity_prelude as serenity;
use spoobot_common::{EmojifyRequest, ShortUrl, ShortenRequest};
use std::time::Instant;
use tracing::info;

/// Social share targets offered under every shortened URL
const SHARE_TARGETS: [(&str, &str); 6] = [
    ("Twitter", "https://twitter.com/intent/tweet?url="),
    ("Facebook", "https://www.facebook.com/sharer/sharer.php?u="),
    ("Telegram", "https://t.me/share/url?url="),
    ("WhatsApp", "https://wa.me/?text="),
    ("Reddit", "https://www.reddit.com/submit?url="),
    ("Snapchat", "https://www.snapchat.com/scan?attachmentUrl="),
];

/// Shorten a Long URL 🤏🏻
#[poise::command(slash_command, guild_only)]
pub async fn shorten(
    ctx: Context<'_>,
    #[description = "The URL to shorten"] url: String,
    #[description = "The custom alias for the URL"] alias: Option<String>,
    #[description = "The maximum number of clicks for the URL"] max_clicks: Option<u32>,
    #[description = "The password for the URL"] password: Option<String>,
) -> Result<(), Error> {
    let started = Instant::now();
    let data = ctx.data();

    if !enforce_cooldown(&ctx, "shorten", &data.shorten_windows).await? {
        return Ok(());
    }

    ctx.defer().await?;

    let request = ShortenRequest {
        url: url.clone(),
        alias,
        max_clicks,
        password,
    };
    let short = data.spoo.shorten(&request).await?;
    info!("Shortened {} -> {}", url, short.url);

    send_short_url_reply(&ctx, &url, &short).await?;
    data.status
        .record_latency(started.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

/// Convert Long Urls to Emojis 😉
#[poise::command(slash_command, guild_only)]
pub async fn emojify(
    ctx: Context<'_>,
    #[description = "The URL to emojify"] url: String,
    #[description = "Custom emoji sequence you want your short url to be"] emojis: Option<String>,
    #[description = "The maximum number of clicks for the URL"] max_clicks: Option<u32>,
    #[description = "The password for the URL"] password: Option<String>,
) -> Result<(), Error> {
    let started = Instant::now();
    let data = ctx.data();

    if !enforce_cooldown(&ctx, "emojify", &data.shorten_windows).await? {
        return Ok(());
    }

    ctx.defer().await?;

    let request = EmojifyRequest {
        url: url.clone(),
        emojis,
        max_clicks,
        password,
    };
    let short = data.spoo.emojify(&request).await?;
    info!("Emojified {} -> {}", url, short.url);

    send_short_url_reply(&ctx, &url, &short).await?;
    data.status
        .record_latency(started.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

/// The success embed plus stats/share buttons, shared by both commands
async fn send_short_url_reply(
    ctx: &Context<'_>,
    original_url: &str,
    short: &ShortUrl,
) -> Result<(), Error> {
    let data = ctx.data();

    let qr_url = format!(
        "{}?text={}&gradient1=(117,129,86)&gradient2=(103,175,38)",
        data.config.urls.qr_endpoint, short.url
    );

    let embed = serenity::CreateEmbed::new()
        .title("URL Shortened Successfully!")
        .description(
            "You can also view the statistics page of the shortened url by clicking \
             the button below, or use /stats to view the statistics.",
        )
        .color(embeds::color(data, |c| &c.primary))
        .thumbnail(qr_url)
        .field("Shortened URL", format!("```{}```", short.url), false)
        .field("Original URL", format!("```{}```", original_url), false)
        .footer(
            serenity::CreateEmbedFooter::new(format!("Shortened by {}", ctx.author().name))
                .icon_url(ctx.author().face()),
        )
        .timestamp(serenity::Timestamp::now());

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .components(share_buttons(&data.config.urls.website, short)),
    )
    .await?;
    Ok(())
}

/// Stats link plus the social share row
fn share_buttons(website: &str, short: &ShortUrl) -> Vec<serenity::CreateActionRow> {
    let stats_button = serenity::CreateButton::new_link(format!(
        "{}/stats/{}",
        website,
        short.short_code()
    ))
    .label("View Statistics");

    let mut share_row = Vec::new();
    for (label, prefix) in SHARE_TARGETS.iter().take(4) {
        share_row
            .push(serenity::CreateButton::new_link(format!("{}{}", prefix, short.url)).label(*label));
    }

    let mut extra_row = vec![stats_button];
    for (label, prefix) in SHARE_TARGETS.iter().skip(4) {
        extra_row
            .push(serenity::CreateButton::new_link(format!("{}{}", prefix, short.url)).label(*label));
    }

    vec![
        serenity::CreateActionRow::Buttons(extra_row),
        serenity::CreateActionRow::Buttons(share_row),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_buttons_layout() {
        let short = ShortUrl {
            url: "https://spoo.me/ga".to_string(),
        };
        let rows = share_buttons("https://spoo.me", &short);
        // Two rows: stats link + 2 targets, then the remaining 4 targets
        assert_eq!(rows.len(), 2);
    }
}
