use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::time::{Duration, Instant};
use whisperwire::adapters::discord::client::{AllowedMentions, WebhookPayload};
use whisperwire::adapters::discord::{DiscordBot, DiscordClient, DiscordEndpoint};
use whisperwire::config::{DiscordConfig, WebhookFormatting};
use whisperwire::domain::ports::Endpoint;
use whisperwire::{Message, WhisperError};

fn discord_config(base_url: String) -> DiscordConfig {
    DiscordConfig {
        token: "test-token".to_string(),
        guild_id: "100".to_string(),
        chat_channel_id: "200".to_string(),
        events_channel_id: None,
        poll_interval_ms: None,
        api_base_url: Some(base_url),
    }
}

#[tokio::test]
async fn test_bot_token_is_sent() -> Result<()> {
    let server = MockServer::start_async().await;
    let me = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/@me")
                .header("authorization", "Bot test-token");
            then.status(200)
                .json_body(json!({"id": "1", "username": "relay", "bot": true}));
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let user = client.current_user().await?;

    me.assert_async().await;
    assert_eq!(user.username, "relay");
    assert!(user.bot);
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_token() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/@me");
            then.status(401).json_body(json!({"message": "401: Unauthorized"}));
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "bad")?;
    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, WhisperError::InvalidToken));
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_is_retried_then_reported() -> Result<()> {
    let server = MockServer::start_async().await;
    let limited = server
        .mock_async(|when, then| {
            when.method(POST).path("/channels/200/messages");
            then.status(429)
                .json_body(json!({"message": "You are being rate limited.", "retry_after": 0.0, "global": false}));
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let err = client.send_message("200", "hello").await.unwrap_err();

    assert_eq!(limited.hits_async().await, 3);
    assert!(matches!(err, WhisperError::DiscordError { status: 429, .. }));
    assert!(err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_send_message_disables_mentions() -> Result<()> {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/channels/200/messages")
                .json_body(json!({"content": "hello", "allowed_mentions": {"parse": []}}));
            then.status(200).json_body(json!({
                "id": "500",
                "content": "hello",
                "author": {"id": "1", "username": "relay", "bot": true}
            }));
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let sent = client.send_message("200", "hello").await?;

    post.assert_async().await;
    assert_eq!(sent.id, "500");
    assert!(!sent.is_from_human());
    Ok(())
}

#[tokio::test]
async fn test_webhook_payload() -> Result<()> {
    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST).path("/webhooks/1/secret").json_body(json!({
                "content": "hi",
                "username": "Steve",
                "allowed_mentions": {"parse": []}
            }));
            then.status(204);
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let payload = WebhookPayload {
        content: "hi".to_string(),
        username: Some("Steve".to_string()),
        avatar_url: None,
        allowed_mentions: AllowedMentions::default(),
    };
    client
        .execute_webhook(&server.url("/webhooks/1/secret"), &payload)
        .await?;

    hook.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_endpoint_renders_chat_format() -> Result<()> {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/channels/200/messages")
                .body_contains("<Steve> hello there");
            then.status(200).json_body(json!({
                "id": "501",
                "content": "<Steve> hello there",
                "author": {"id": "1", "username": "relay", "bot": true}
            }));
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let endpoint = DiscordEndpoint::new(client, "200", "<{username}> {message}");
    assert_eq!(Endpoint::id(&endpoint), "discord-200");

    Endpoint::send_message(&endpoint, &Message::of("minecraft-global", "Steve", "hello there"))
        .await?;
    Endpoint::send_message(&endpoint, &Message::of("minecraft-global", "Steve", "   ")).await?;

    assert_eq!(post.hits_async().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_endpoint_webhook_impersonates_sender() -> Result<()> {
    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST).path("/webhooks/9/token").json_body(json!({
                "content": "hello",
                "username": "[MC] Steve",
                "avatar_url": "https://mc-heads.net/avatar/uuid-1",
                "allowed_mentions": {"parse": []}
            }));
            then.status(204);
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let endpoint = DiscordEndpoint::new(client, "200", "<{username}> {message}").with_webhook(
        server.url("/webhooks/9/token"),
        WebhookFormatting {
            username_format: "[MC] {username}".to_string(),
            avatar_url: "https://mc-heads.net/avatar/{uuid}".to_string(),
        },
    );

    let message = Message::of("minecraft-global", "Steve", "hello").with_sender_id("uuid-1");
    Endpoint::send_message(&endpoint, &message).await?;

    hook.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_bot_start_and_channel_lookup() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/@me");
            then.status(200).json_body(json!({"id": "1", "username": "relay", "bot": true}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/guilds/100");
            then.status(200).json_body(json!({"id": "100", "name": "Test Guild"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/channels/200");
            then.status(200)
                .json_body(json!({"id": "200", "type": 0, "guild_id": "100", "name": "chat"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/channels/201");
            then.status(200)
                .json_body(json!({"id": "201", "type": 2, "guild_id": "100", "name": "voice"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/channels/202");
            then.status(200)
                .json_body(json!({"id": "202", "type": 0, "guild_id": "999", "name": "elsewhere"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/channels/404");
            then.status(404).json_body(json!({"message": "Unknown Channel", "code": 10003}));
        })
        .await;

    let mut bot = DiscordBot::new(discord_config(server.base_url()))?;
    bot.start().await?;
    assert!(bot.is_started());
    assert_eq!(bot.guild().map(|g| g.name.as_str()), Some("Test Guild"));

    assert!(bot.text_channel("200").await?.is_some());
    assert!(bot.text_channel("201").await?.is_none());
    assert!(bot.text_channel("202").await?.is_none());
    assert!(bot.text_channel("404").await?.is_none());

    bot.shutdown();
    assert!(!bot.is_started());
    Ok(())
}

#[tokio::test]
async fn test_bot_missing_guild_is_not_fatal() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/@me");
            then.status(200).json_body(json!({"id": "1", "username": "relay", "bot": true}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/guilds/100");
            then.status(404).json_body(json!({"message": "Unknown Guild"}));
        })
        .await;

    let mut bot = DiscordBot::new(discord_config(server.base_url()))?;
    bot.start().await?;
    assert!(bot.guild().is_none());
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_honours_retry_after_header() -> Result<()> {
    let server = MockServer::start_async().await;
    let limited = server
        .mock_async(|when, then| {
            when.method(GET).path("/guilds/100");
            then.status(429)
                .header("retry-after", "0")
                .body("slow down");
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let started = Instant::now();
    let err = client.guild("100").await.unwrap_err();

    // Without the header each retry would fall back to a one second wait.
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(limited.hits_async().await, 3);
    assert!(matches!(err, WhisperError::DiscordError { status: 429, .. }));
    Ok(())
}

#[tokio::test]
async fn test_webhook_avatar_falls_back_to_username() -> Result<()> {
    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST).path("/webhooks/9/token").json_body(json!({
                "content": "hello",
                "username": "Steve",
                "avatar_url": "https://mc-heads.net/avatar/Steve",
                "allowed_mentions": {"parse": []}
            }));
            then.status(204);
        })
        .await;

    let client = DiscordClient::new(server.base_url(), "test-token")?;
    let endpoint = DiscordEndpoint::new(client, "200", "<{username}> {message}").with_webhook(
        server.url("/webhooks/9/token"),
        WebhookFormatting {
            username_format: "{username}".to_string(),
            avatar_url: "https://mc-heads.net/avatar/{uuid}".to_string(),
        },
    );

    Endpoint::send_message(&endpoint, &Message::of("minecraft-global", "Steve", "hello")).await?;

    hook.assert_async().await;
    Ok(())
}
