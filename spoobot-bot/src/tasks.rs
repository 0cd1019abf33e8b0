//! Background tasks: service-stats channel updates and cooldown cleanup

use poise::serenity_prelude as serenity;
use spoobot_commands::CooldownManager;
use spoobot_common::SpooClient;
use spoobot_config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cooldown keys idle longer than this are dropped
const COOLDOWN_IDLE_HORIZON: Duration = Duration::from_secs(2 * 86400);

/// Periodically rename the configured stats channels with the service's
/// current totals
pub fn spawn_stats_updater(
    http: Arc<serenity::Http>,
    config: Arc<Config>,
    spoo: SpooClient,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(
            config.server.stats_update_minutes * 60,
        ));

        loop {
            interval.tick().await;
            if let Err(e) = update_stats_channels(&http, &config, &spoo).await {
                warn!("Stats channel update failed: {}", e);
            }
        }
    })
}

async fn update_stats_channels(
    http: &serenity::Http,
    config: &Config,
    spoo: &SpooClient,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let metrics = spoo.get_service_metrics().await?;

    let clicks_channel: u64 = config.discord.stats_clicks_channel_id.parse()?;
    let shortlinks_channel: u64 = config.discord.stats_shortlinks_channel_id.parse()?;

    serenity::ChannelId::new(clicks_channel)
        .edit(
            http,
            serenity::EditChannel::new().name(format!("📈︱Clicks— {}", metrics.total_clicks)),
        )
        .await?;

    serenity::ChannelId::new(shortlinks_channel)
        .edit(
            http,
            serenity::EditChannel::new().name(format!("🔗︱Links— {}", metrics.total_shortlinks)),
        )
        .await?;

    info!(
        "Stats channels updated ({} links, {} clicks)",
        metrics.total_shortlinks, metrics.total_clicks
    );
    Ok(())
}

/// Hourly sweep of idle cooldown keys
pub fn spawn_cooldown_cleanup(cooldowns: Arc<CooldownManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;
            cooldowns.cleanup_idle(COOLDOWN_IDLE_HORIZON);
            debug!("Cooldown cleanup ran, {} keys remain", cooldowns.active_keys());
        }
    })
}
