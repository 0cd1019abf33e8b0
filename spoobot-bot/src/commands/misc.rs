//! Informational commands: help, about, invite, support, bot-stats, ping

use crate::bot::{Context, Error};
use crate::embeds;
use poise::serenity_prelude as serenity;
use std::time::Instant;
use tracing::warn;

/// Command summaries shown by /help
const COMMAND_HELP: [(&str, &str); 8] = [
    (
        "/shorten 🤏🏻 — shorten your long urls",
        "**Parameters:**\n- **url** - The url you want to shorten 🌐\n- **alias** - The custom alias for the url (optional) 🆔\n- **password** - The password for the url (optional) 🔑\n- **max_clicks** - The maximum number of clicks for the url (optional) 🖱️",
    ),
    (
        "/emojify 😉 — generate a short emoji link",
        "**Parameters:**\n- **url** - The url you want to shorten 🌐\n- **emojis** - The custom emojis for the url (optional) 😎\n- **password** - The password for the url (optional) 🔑\n- **max_clicks** - The maximum number of clicks for the url (optional) 🖱️",
    ),
    (
        "/stats 📊 — detailed statistical insights and charts of your shortened urls",
        "**Parameters:**\n- **short_code** - The short code of the url 🔢\n- **password** - The password of the url, if protected (optional) 🔑",
    ),
    (
        "/get-code 💻",
        "Get ready-to-run code for the spoo.me API in your preferred language",
    ),
    ("/bot-stats 🤖", "Get detailed information about the bot"),
    ("/about ℹ️", "View information about the bot and the service"),
    ("/support 📞", "Get the support server invite link"),
    ("/invite 💌", "Get the bot's invite link for your own server"),
];

/// See the list of available commands ❔
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut embed = serenity::CreateEmbed::new()
        .title("SpooBot Commands")
        .description("Here is the list of the available commands:")
        .color(embeds::color(ctx.data(), |c| &c.primary))
        .footer(embeds::requested_by(&ctx))
        .timestamp(serenity::Timestamp::now());

    for (name, description) in COMMAND_HELP {
        embed = embed.field(name, description, false);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// View information about the bot 🤖
#[poise::command(slash_command)]
pub async fn about(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();

    let mut embed = serenity::CreateEmbed::new()
        .title("About SpooBot 🙌")
        .description("```The official Discord bot of the spoo.me URL shortener.```")
        .color(embeds::color(data, |c| &c.info))
        .url(&data.config.urls.website)
        .field(
            "What service does SpooBot use? 🌐",
            "```SpooBot uses the spoo.me URL shortening service. spoo.me is a fast, \
             reliable and secure URL shortener. 🚀```",
            false,
        )
        .field(
            "Where can I find the source code? 💻",
            "```The source code for SpooBot lives on GitHub. 🌟```",
            false,
        )
        .field(
            "Who made SpooBot? 👥",
            "```SpooBot was made by the devs of spoo.me. 🙏```",
            false,
        )
        .footer(embeds::requested_by(&ctx))
        .timestamp(serenity::Timestamp::now());

    // Service totals are decoration; the embed works without them
    match data.spoo.get_service_metrics().await {
        Ok(metrics) => {
            embed = embed
                .field(
                    "Total Shortlinks 🔗",
                    format!("```{}```", metrics.total_shortlinks),
                    true,
                )
                .field(
                    "Total Clicks 📈",
                    format!("```{}```", metrics.total_clicks),
                    true,
                );
        }
        Err(e) => warn!("Service metrics unavailable for /about: {}", e),
    }

    let buttons = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new_link(&data.config.urls.github).label("View Source Code"),
        serenity::CreateButton::new_link(&data.config.urls.website).label("View Website"),
    ]);

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .components(vec![buttons]),
    )
    .await?;
    Ok(())
}

/// Get the invite link for the bot 💌
#[poise::command(slash_command)]
pub async fn invite(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let embed = serenity::CreateEmbed::new()
        .title("Invite SpooBot to your server!")
        .description(format!(
            "Click [here]({}) to invite SpooBot to your server!",
            data.config.urls.bot_invite
        ))
        .color(embeds::color(data, |c| &c.warning))
        .footer(embeds::requested_by(&ctx))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Join the support server of the bot 🛠️
#[poise::command(slash_command)]
pub async fn support(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let embed = serenity::CreateEmbed::new()
        .title("Join the SpooBot Support Server!")
        .description(format!(
            "Click {} to join the support server for SpooBot!",
            data.config.urls.support_invite
        ))
        .color(embeds::color(data, |c| &c.warning))
        .footer(embeds::requested_by(&ctx))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// View the stats of the bot 🤖
#[poise::command(slash_command, rename = "bot-stats")]
pub async fn bot_stats(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let cache = &ctx.serenity_context().cache;

    let embed = serenity::CreateEmbed::new()
        .title("SpooBot Stats")
        .description("Here are the stats of the bot:")
        .color(embeds::color(data, |c| &c.primary))
        .field("Servers", format!("```{}```", cache.guild_count()), true)
        .field("Users", format!("```{}```", cache.user_count()), true)
        .field(
            "Uptime",
            format!("```{}```", data.status.uptime_display()),
            false,
        )
        .field(
            "Command Prefix",
            format!("```{}```", data.config.bot.command_prefix),
            true,
        )
        .field(
            "Total Commands",
            format!("```{}```", crate::commands::all().len()),
            true,
        )
        .footer(embeds::requested_by(&ctx))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Check the bot's latency 🏓
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let started = Instant::now();

    let handle = ctx
        .send(
            poise::CreateReply::default().embed(
                serenity::CreateEmbed::new()
                    .title("Pong!")
                    .color(embeds::color(data, |c| &c.success)),
            ),
        )
        .await?;

    let message_latency = started.elapsed().as_secs_f64() * 1000.0;
    data.status.record_latency(message_latency);
    let gateway_latency = ctx.ping().await;

    let mut embed = serenity::CreateEmbed::new()
        .title("Pong!")
        .color(embeds::color(data, |c| &c.success))
        .field(
            "Latency",
            format!("{:.2} ms", gateway_latency.as_secs_f64() * 1000.0),
            false,
        )
        .field(
            "Message Latency",
            format!("{:.2} ms", message_latency),
            false,
        )
        .footer(embeds::requested_by(&ctx));

    if let Some(average) = data.status.average_latency() {
        embed = embed.field("Average Ping", format!("{:.2} ms", average), false);
    }
    embed = embed.field(
        "Uptime",
        data.status.uptime_display(),
        false,
    );

    handle
        .edit(ctx, poise::CreateReply::default().embed(embed))
        .await?;
    Ok(())
}
