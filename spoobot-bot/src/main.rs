//! SpooBot - Main Entry Point

mod bot;
mod commands;
mod embeds;
mod tasks;

use anyhow::{anyhow, Context as _, Result};
use bot::{BotStatus, Data};
use clap::Parser;
use poise::serenity_prelude::{self as serenity, GatewayIntents};
use spoobot_charts::{
    ChartPalette, ChartStyle, ColorPair, HeatmapRenderer, QuickChartClient, RenderStack,
};
use spoobot_commands::{CooldownManager, RateWindow};
use spoobot_common::{init_logging, LoggingConfig, SpooClient, SpooClientConfig};
use spoobot_config::{ChartColorPair, Config, ConfigLoader};
use std::sync::Arc;
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Log level override
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    init_logging(LoggingConfig {
        level: args
            .log_level
            .clone()
            .unwrap_or_else(|| config.logging.level.clone()),
        file_path: config.logging.file.clone(),
        ..LoggingConfig::default()
    })
    .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Configuration loaded and validated");

    let data = build_data(config).context("Failed to build application state")?;
    let token = data.config.bot.token.clone();
    let custom_status = data.config.bot.custom_status.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(bot::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(bot::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {} (ID: {})", ready.user.name, ready.user.id);

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Slash commands registered globally");

                ctx.set_activity(Some(serenity::ActivityData::custom(custom_status)));

                tasks::spawn_stats_updater(
                    ctx.http.clone(),
                    data.config.clone(),
                    data.spoo.clone(),
                );
                tasks::spawn_cooldown_cleanup(data.cooldowns.clone());

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .context("Failed to create Discord client")?;

    info!("Starting SpooBot");
    client.start().await.context("Client error")?;
    Ok(())
}

/// Assemble the shared application state from validated configuration
fn build_data(config: Config) -> Result<Data> {
    let spoo = SpooClient::new(
        SpooClientConfig::new(config.spoo.base_url.clone())
            .with_timeout(config.spoo.timeout_seconds)
            .with_rate_limit(config.spoo.rate_limit_per_sec)
            .with_max_retries(config.spoo.max_retries as usize),
    )?;

    let style = ChartStyle {
        background: config.charts.style.background.clone(),
        grid_color: config.charts.style.grid_color.clone(),
        text_color: config.charts.style.text_color.clone(),
        font_size: config.charts.style.font_size,
        border_width: config.charts.style.border_width,
        border_radius: config.charts.style.border_radius,
        line_tension: config.charts.style.line_tension,
    };
    let quickchart = QuickChartClient::new(config.charts.render_endpoint.clone(), style)?;

    let heatmaps = HeatmapRenderer::new(
        config.charts.heatmap.width,
        config.charts.heatmap.height,
        config.charts.heatmap.max_countries as usize,
    );

    let palette = ChartPalette {
        platform: color_pairs(&config.charts.colors.platform),
        browser: color_pairs(&config.charts.colors.browser),
        referrer: color_pairs(&config.charts.colors.referrer),
        timeline: color_pairs(&config.charts.colors.timeline),
    };

    let shorten_windows = RateWindow::from_config(&config.cooldowns)?;
    // The stats report itself is throttled like the source bot: once per
    // half minute per user
    let stats_windows = vec![RateWindow::per_seconds(1, 30)?];

    Ok(Data {
        config: Arc::new(config),
        spoo,
        render_stack: Arc::new(RenderStack::new(quickchart, heatmaps, palette)),
        cooldowns: Arc::new(CooldownManager::new()),
        shorten_windows,
        stats_windows,
        status: BotStatus::default(),
    })
}

fn color_pairs(pairs: &[ChartColorPair]) -> Vec<ColorPair> {
    pairs
        .iter()
        .map(|pair| ColorPair::new(pair.fill.clone(), pair.border.clone()))
        .collect()
}
