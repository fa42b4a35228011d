use crate::utils::error::{Result, WhisperError};
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Into<String>, reason: impl Into<String>) -> WhisperError {
    WhisperError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// A `${VAR}` left in place by substitution means the variable was not set.
fn unresolved_variable(value: &str) -> Option<&str> {
    let start = value.find("${")?;
    let end = value[start..].find('}')?;
    Some(&value[start + 2..start + end])
}

/// Bot tokens are opaque, but never blank, never contain whitespace, and
/// must not still hold an unresolved `${VAR}`.
pub fn validate_bot_token(field: &str, token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(invalid(field, "", "Bot token cannot be empty"));
    }
    if let Some(var) = unresolved_variable(token) {
        return Err(invalid(
            field,
            "<redacted>",
            format!("Environment variable {} is not set", var),
        ));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(invalid(field, "<redacted>", "Bot token contains whitespace"));
    }
    Ok(())
}

/// Discord ids (snowflakes) are non-zero unsigned 64-bit integers in decimal.
pub fn validate_discord_id(field: &str, id: &str) -> Result<()> {
    match id.parse::<u64>() {
        Ok(0) => Err(invalid(field, id, "Discord IDs are never zero")),
        Ok(_) => Ok(()),
        Err(_) => Err(invalid(field, id, "Discord IDs must be numeric")),
    }
}

/// API base and webhook URLs are called with reqwest over http(s) only.
pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url =
        Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

/// Webhook URLs carry their own credentials in the path.
pub fn validate_webhook_url(field: &str, value: &str) -> Result<()> {
    validate_http_url(field, value)?;
    if !value.contains("/webhooks/") {
        return Err(invalid(
            field,
            value,
            "Expected a Discord webhook URL (.../webhooks/{id}/{token})",
        ));
    }
    Ok(())
}

/// Chat templates must render something and every `{` must be closed.
pub fn validate_template(field: &str, template: &str) -> Result<()> {
    if template.trim().is_empty() {
        return Err(invalid(field, template, "Template cannot be empty"));
    }
    let mut open = false;
    for c in template.chars() {
        match c {
            '{' if open => return Err(invalid(field, template, "Nested '{' in placeholder")),
            '{' => open = true,
            '}' => open = false,
            _ => {}
        }
    }
    if open {
        return Err(invalid(field, template, "Unclosed '{' in placeholder"));
    }
    Ok(())
}

pub fn validate_poll_interval(field: &str, millis: u64, min: Duration) -> Result<()> {
    if Duration::from_millis(millis) < min {
        return Err(invalid(
            field,
            millis.to_string(),
            format!(
                "Polling faster than every {}ms would hit Discord rate limits",
                min.as_millis()
            ),
        ));
    }
    Ok(())
}

pub fn validate_log_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Log file path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    if path.ends_with('/') || path.ends_with('\\') {
        return Err(invalid(field, path, "Log file path points at a directory"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bot_token() {
        assert!(validate_bot_token("discord.token", "MTIz.abc.def").is_ok());
        assert!(validate_bot_token("discord.token", "  ").is_err());
        assert!(validate_bot_token("discord.token", "abc def").is_err());

        let err = validate_bot_token("discord.token", "${DISCORD_TOKEN}").unwrap_err();
        assert!(err.to_string().contains("DISCORD_TOKEN"));
    }

    #[test]
    fn test_validate_discord_id() {
        assert!(validate_discord_id("discord.guild_id", "123456789012345678").is_ok());
        assert!(validate_discord_id("discord.guild_id", "guild1").is_err());
        assert!(validate_discord_id("discord.guild_id", "").is_err());
        assert!(validate_discord_id("discord.guild_id", "0").is_err());
    }

    #[test]
    fn test_validate_urls() {
        assert!(validate_http_url("discord.api_base_url", "http://localhost:8080").is_ok());
        assert!(validate_http_url("discord.api_base_url", "ftp://example.com").is_err());
        assert!(validate_http_url("discord.api_base_url", "invalid-url").is_err());

        let webhook = "https://discord.com/api/webhooks/1/abc";
        assert!(validate_webhook_url("webhook.url", webhook).is_ok());
        assert!(validate_webhook_url("webhook.url", "https://discord.com/api/channels/1").is_err());
    }

    #[test]
    fn test_validate_template() {
        assert!(validate_template("minecraft.chat_format", "<{username}> {message}").is_ok());
        assert!(validate_template("minecraft.chat_format", "").is_err());
        assert!(validate_template("minecraft.chat_format", "<{username> {message}").is_err());
        assert!(validate_template("minecraft.chat_format", "{message").is_err());
    }

    #[test]
    fn test_validate_poll_interval() {
        let min = Duration::from_millis(250);
        assert!(validate_poll_interval("discord.poll_interval_ms", 2000, min).is_ok());
        assert!(validate_poll_interval("discord.poll_interval_ms", 0, min).is_err());
    }

    #[test]
    fn test_validate_log_path() {
        assert!(validate_log_path("logging.log_file_path", "logs/whisperwire.log").is_ok());
        assert!(validate_log_path("logging.log_file_path", "").is_err());
        assert!(validate_log_path("logging.log_file_path", "logs/").is_err());
        assert!(validate_log_path("logging.log_file_path", "bad\0path").is_err());
    }
}
