// Tests for local client configuration loading and session config derivation

use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use voice_agent_client::{AppConfig, ClientConfig, SessionConfig};

#[test]
fn test_load_from_toml_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("client.toml");
    fs::write(
        &path,
        r#"
[server]
url = "http://localhost:7860/api"

[room]
url = "https://acme.daily.co/standup"

[session]
start_audio_off = true
"#,
    )?;

    let cfg = ClientConfig::load(path.to_str().unwrap())?;

    assert_eq!(cfg.server.url.as_deref(), Some("http://localhost:7860/api"));
    assert_eq!(cfg.room.url.as_deref(), Some("https://acme.daily.co/standup"));
    assert!(cfg.session.start_audio_off);

    Ok(())
}

#[test]
fn test_missing_file_uses_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("does-not-exist");

    let cfg = ClientConfig::load(path.to_str().unwrap())?;

    assert!(cfg.room.url.is_none());
    assert!(!cfg.session.start_audio_off);

    Ok(())
}

#[test]
fn test_session_config_from_app_config() {
    let app = AppConfig {
        manual_room_entry: true,
        open_mic: false,
        ..AppConfig::default()
    };

    let session = SessionConfig::from_app_config(&app, Some(" https://a.daily.co/r ".to_string()), true);

    assert!(session.manual_room_entry);
    assert!(!session.auto_room_creation());
    assert!(!session.open_mic);
    assert!(session.start_audio_off);
    assert_eq!(session.room_url(), Some("https://a.daily.co/r"));
}
