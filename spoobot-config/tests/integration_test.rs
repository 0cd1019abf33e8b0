//! Integration tests loading the shipped configuration template

use spoobot_config::ConfigLoader;
use std::env;
use std::path::PathBuf;

fn template_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config.template.toml")
}

#[test]
fn template_loads_with_token_from_environment() {
    env::set_var("SPOOBOT_DISCORD_TOKEN", "abc.def.ghi");

    let config = ConfigLoader::load_from_file(template_path())
        .expect("config template should load and validate");

    assert_eq!(config.bot.token, "abc.def.ghi");
    assert_eq!(config.spoo.base_url, "https://spoo.me");
    assert_eq!(config.cooldowns.short_term.count, 1);
    assert_eq!(config.cooldowns.short_term.seconds, 10);
    assert_eq!(config.cooldowns.medium_term.count, 5);
    assert_eq!(config.cooldowns.long_term.seconds, 86400);
    assert_eq!(config.charts.colors.platform.len(), 2);
    assert_eq!(config.server.stats_update_minutes, 10);

    env::remove_var("SPOOBOT_DISCORD_TOKEN");
}

#[test]
fn template_fails_without_token_in_environment() {
    // A separate variable name would not collide with the passing test, so
    // run against a copy that references an unset variable
    let raw = std::fs::read_to_string(template_path()).unwrap();
    let patched = raw.replace("SPOOBOT_DISCORD_TOKEN", "SPOOBOT_UNSET_TOKEN_FOR_TEST");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, patched).unwrap();

    env::remove_var("SPOOBOT_UNSET_TOKEN_FOR_TEST");
    assert!(ConfigLoader::load_from_file(&path).is_err());
}
