//! /stats command and the interactive report session loop

use crate::bot::{enforce_cooldown, Context, Error};
use crate::embeds;
use poise::serenity_prelude as serenity;
use spoobot_charts::{ChartArtifact, ChartKind, ExportFormat};
use spoobot_commands::{ChartSelection, ExportSelection, ReportSession};
use spoobot_common::UrlStatistics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const CHART_MENU_ID: &str = "stats_charts";
const EXPORT_MENU_ID: &str = "stats_exports";

/// How long the report keeps accepting menu selections. The chat platform
/// bounds the interaction window anyway; this just stops the collector.
const SESSION_LIFETIME: Duration = Duration::from_secs(600);

/// Embed fields are capped at 1024 characters; anything longer is dropped
const MAX_RAW_FIELD: usize = 1000;

/// View URL Statistics 📊
#[poise::command(slash_command, guild_only)]
pub async fn stats(
    ctx: Context<'_>,
    #[description = "The short code of the url to view statistics for"] short_code: String,
    #[description = "The password for the URL"] password: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();

    if !enforce_cooldown(&ctx, "stats", &data.stats_windows).await? {
        return Ok(());
    }

    ctx.send(
        poise::CreateReply::default()
            .embed(
                serenity::CreateEmbed::new()
                    .description("Fetching statistics...")
                    .color(embeds::color(data, |c| &c.primary)),
            )
            .ephemeral(true),
    )
    .await?;

    let stats = data
        .spoo
        .get_statistics(&short_code, password.as_deref())
        .await?;
    info!("Fetched statistics for short code '{}'", stats.short_code);

    // The seven-day chart is decoration; the report still works without it
    let summary_chart = match data.render_stack.render_summary(&stats).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Summary chart failed: {}", e);
            None
        }
    };

    let embed = summary_embed(&ctx, &stats, summary_chart.as_deref());
    let protected = stats.is_protected();

    let session = Arc::new(ReportSession::new(
        stats,
        data.render_stack.clone(),
        data.render_stack.clone(),
    ));
    let components = menu_rows(&session);

    // Password-protected reports go to the requester's DMs
    let message = if protected {
        ctx.author()
            .direct_message(
                ctx,
                serenity::CreateMessage::new()
                    .embed(embed)
                    .components(components),
            )
            .await?
    } else {
        ctx.channel_id()
            .send_message(
                ctx,
                serenity::CreateMessage::new()
                    .embed(embed)
                    .components(components),
            )
            .await?
    };

    run_session(&ctx, &message, &session).await
}

/// Drive the report's select menus until the session lifetime expires
async fn run_session(
    ctx: &Context<'_>,
    message: &serenity::Message,
    session: &Arc<ReportSession>,
) -> Result<(), Error> {
    while let Some(interaction) = serenity::ComponentInteractionCollector::new(*ctx)
        .message_id(message.id)
        .timeout(SESSION_LIFETIME)
        .await
    {
        let value = match &interaction.data.kind {
            serenity::ComponentInteractionDataKind::StringSelect { values } => {
                match values.first() {
                    Some(value) => value.clone(),
                    None => continue,
                }
            }
            _ => continue,
        };

        interaction
            .create_response(
                ctx,
                serenity::CreateInteractionResponse::Defer(
                    serenity::CreateInteractionResponseMessage::new(),
                ),
            )
            .await?;

        match interaction.data.custom_id.as_str() {
            CHART_MENU_ID => handle_chart_selection(ctx, &interaction, session, &value).await?,
            EXPORT_MENU_ID => handle_export_selection(ctx, &interaction, session, &value).await?,
            _ => {}
        }
    }
    Ok(())
}

async fn handle_chart_selection(
    ctx: &Context<'_>,
    interaction: &serenity::ComponentInteraction,
    session: &Arc<ReportSession>,
    value: &str,
) -> Result<(), Error> {
    let Some(kind) = ChartKind::from_value(value) else {
        return Ok(());
    };

    match session.select_chart(kind).await {
        Ok(ChartSelection::Rendered(artifact)) => {
            let mut embed = chart_embed(ctx, session, kind);
            let mut followup = serenity::CreateInteractionResponseFollowup::new();

            match artifact {
                ChartArtifact::Url(url) => {
                    embed = embed.image(url);
                }
                ChartArtifact::File(path) => {
                    let bytes = tokio::fs::read(&path).await?;
                    tokio::fs::remove_file(&path).await.ok();
                    followup = followup
                        .add_file(serenity::CreateAttachment::bytes(bytes, "heatmap.png"));
                    embed = embed.image("attachment://heatmap.png");
                }
            }

            interaction
                .create_followup(ctx, followup.embed(embed))
                .await?;

            if session.chart_menu_disabled() {
                refresh_menus(ctx, interaction, session).await?;
            }
        }
        Ok(ChartSelection::AlreadyUsed) => {
            notify(ctx, interaction, &format!(
                "{} option has already been used before.",
                kind.label()
            ))
            .await?;
        }
        Ok(ChartSelection::Exhausted) => {
            notify(ctx, interaction, "Every chart option has already been used.").await?;
        }
        Err(e) => {
            let embed = embeds::command_error_embed(ctx, &e.to_string(), "stats");
            interaction
                .create_followup(
                    ctx,
                    serenity::CreateInteractionResponseFollowup::new()
                        .embed(embed)
                        .ephemeral(true),
                )
                .await?;
        }
    }
    Ok(())
}

async fn handle_export_selection(
    ctx: &Context<'_>,
    interaction: &serenity::ComponentInteraction,
    session: &Arc<ReportSession>,
    value: &str,
) -> Result<(), Error> {
    let Some(format) = ExportFormat::from_value(value) else {
        return Ok(());
    };

    match session.select_export(format).await {
        Ok(ExportSelection::Exported(file)) => {
            let bytes = tokio::fs::read(&file.path).await?;
            tokio::fs::remove_file(&file.path).await.ok();

            interaction
                .create_followup(
                    ctx,
                    serenity::CreateInteractionResponseFollowup::new()
                        .content(format!("Short Code - `{}`", session.short_code()))
                        .add_file(serenity::CreateAttachment::bytes(bytes, file.file_name)),
                )
                .await?;

            if session.export_menu_disabled() {
                refresh_menus(ctx, interaction, session).await?;
            }
        }
        Ok(ExportSelection::AlreadyUsed) => {
            notify(ctx, interaction, &format!(
                "{} option has already been used before.",
                format.label()
            ))
            .await?;
        }
        Ok(ExportSelection::Exhausted) => {
            notify(ctx, interaction, "Every export option has already been used.").await?;
        }
        Err(e) => {
            let embed = embeds::command_error_embed(ctx, &e.to_string(), "stats");
            interaction
                .create_followup(
                    ctx,
                    serenity::CreateInteractionResponseFollowup::new()
                        .embed(embed)
                        .ephemeral(true),
                )
                .await?;
        }
    }
    Ok(())
}

/// Ephemeral "already used" style notice
async fn notify(
    ctx: &Context<'_>,
    interaction: &serenity::ComponentInteraction,
    message: &str,
) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("An Error Occurred")
        .description(format!("```{}```", message))
        .color(embeds::color(ctx.data(), |c| &c.error));

    interaction
        .create_followup(
            ctx,
            serenity::CreateInteractionResponseFollowup::new()
                .embed(embed)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Disable exhausted menus on the original report message
async fn refresh_menus(
    ctx: &Context<'_>,
    interaction: &serenity::ComponentInteraction,
    session: &Arc<ReportSession>,
) -> Result<(), Error> {
    let mut message = interaction.message.clone();
    message
        .edit(
            ctx,
            serenity::EditMessage::new().components(menu_rows(session)),
        )
        .await?;
    Ok(())
}

/// The two select menu rows, reflecting the session's disabled flags
fn menu_rows(session: &ReportSession) -> Vec<serenity::CreateActionRow> {
    let chart_options: Vec<serenity::CreateSelectMenuOption> = ChartKind::ALL
        .iter()
        .map(|kind| {
            serenity::CreateSelectMenuOption::new(kind.label(), kind.value())
                .description(kind.description())
                .emoji(serenity::ReactionType::Unicode(kind.emoji().to_string()))
        })
        .collect();

    let chart_menu = serenity::CreateSelectMenu::new(
        CHART_MENU_ID,
        serenity::CreateSelectMenuKind::String {
            options: chart_options,
        },
    )
    .placeholder("➕ Additional Statistics Chart")
    .min_values(1)
    .max_values(1)
    .disabled(session.chart_menu_disabled());

    let export_options: Vec<serenity::CreateSelectMenuOption> = ExportFormat::ALL
        .iter()
        .map(|format| {
            serenity::CreateSelectMenuOption::new(format.label(), format.value())
                .description(format.description())
                .emoji(serenity::ReactionType::Unicode(format.emoji().to_string()))
        })
        .collect();

    let export_menu = serenity::CreateSelectMenu::new(
        EXPORT_MENU_ID,
        serenity::CreateSelectMenuKind::String {
            options: export_options,
        },
    )
    .placeholder("📥 Export Statistics Data")
    .min_values(1)
    .max_values(1)
    .disabled(session.export_menu_disabled());

    vec![
        serenity::CreateActionRow::SelectMenu(chart_menu),
        serenity::CreateActionRow::SelectMenu(export_menu),
    ]
}

/// The initial report embed
fn summary_embed(
    ctx: &Context<'_>,
    stats: &UrlStatistics,
    summary_chart: Option<&str>,
) -> serenity::CreateEmbed {
    let data = ctx.data();
    let website = &data.config.urls.website;

    let last_click = stats
        .last_click()
        .map(|click| {
            format!(
                "```Time - {}```\n```Browser - {}```\n```Platform - {}```",
                click.time, click.browser, click.platform
            )
        })
        .unwrap_or_else(|| "```No clicks yet```".to_string());

    let mut embed = serenity::CreateEmbed::new()
        .title("URL Statistics 📊")
        .description(format!(
            "Statistics for short url - `{}/{}`",
            website, stats.short_code
        ))
        .color(embeds::color(data, |c| &c.primary))
        .url(format!("{}/stats/{}", website, stats.short_code))
        .field("Original URL", format!("```{}```", stats.long_url), false)
        .field("Total Clicks", format!("```{}```", stats.total_clicks), true)
        .field(
            "Total Unique Clicks",
            format!("```{}```", stats.total_unique_clicks),
            true,
        )
        .field("Created At", format!("```{}```", stats.created_at), false)
        .field("Last Click", last_click, true)
        .field(
            "Average Clicks",
            format!(
                "```Daily - {}```\n```Weekly - {}```\n```Monthly - {}```",
                stats.average_daily_clicks(),
                stats.average_weekly_clicks(),
                stats.average_monthly_clicks()
            ),
            true,
        )
        .footer(embeds::requested_by(ctx))
        .timestamp(serenity::Timestamp::now());

    if let Some(url) = summary_chart {
        embed = embed.image(url);
    }
    if stats.is_protected() {
        embed = embed.field("Password", "```protected```", false);
    }
    embed
}

/// Embed for one rendered chart option, without the image (the caller
/// attaches it)
fn chart_embed(
    ctx: &Context<'_>,
    session: &ReportSession,
    kind: ChartKind,
) -> serenity::CreateEmbed {
    let data = ctx.data();
    let stats = session.statistics();

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{} {}", kind.label(), kind.emoji()))
        .description(kind.summary())
        .color(embeds::color(data, |c| &c.primary))
        .url(format!(
            "{}/stats/{}",
            data.config.urls.website, stats.short_code
        ))
        .field("Short Code", format!("```{}```", stats.short_code), false)
        .footer(embeds::requested_by(ctx))
        .timestamp(serenity::Timestamp::now());

    for (name, value) in raw_data_fields(kind, stats) {
        embed = embed.field(name, value, false);
    }
    embed
}

/// Raw data fields mirroring the rendered chart; fields over the embed
/// limit are silently dropped
fn raw_data_fields(kind: ChartKind, stats: &UrlStatistics) -> Vec<(&'static str, String)> {
    let pairs: Vec<(&'static str, Option<String>)> = match kind {
        ChartKind::PlatformAnalysis => vec![
            ("Raw Non-Unique Data", raw_json(&stats.platforms)),
            ("Raw Unique Data", raw_json(&stats.unique_platforms)),
        ],
        ChartKind::BrowserAnalysis => vec![
            ("Raw Non-Unique Data", raw_json(&stats.browsers)),
            ("Raw Unique Data", raw_json(&stats.unique_browsers)),
        ],
        ChartKind::ReferrerAnalysis => vec![
            ("Raw Non-Unique Data", raw_json(&stats.referrers)),
            ("Raw Unique Data", raw_json(&stats.unique_referrers)),
        ],
        ChartKind::CountriesHeatmap => {
            vec![("Raw Countries Data", raw_json(&stats.countries))]
        }
        ChartKind::UniqueCountriesHeatmap => vec![(
            "Raw Unique Countries Data",
            raw_json(&stats.unique_countries),
        )],
        ChartKind::ClicksOverTime => vec![
            ("Raw Non-Unique Data", raw_json(&stats.daily_clicks)),
            ("Raw Unique Data", raw_json(&stats.daily_unique_clicks)),
        ],
    };

    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
}

fn raw_json(map: &std::collections::HashMap<String, u64>) -> Option<String> {
    let json = serde_json::to_string(map).ok()?;
    if json.len() > MAX_RAW_FIELD {
        return None;
    }
    Some(format!("```json\n{}```", json))
}
