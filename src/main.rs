use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use whisperwire::adapters::console::{console_events, ConsoleAudience};
use whisperwire::utils::error::ErrorSeverity;
use whisperwire::utils::logger;
use whisperwire::utils::monitor::SystemMonitor;
use whisperwire::{CliConfig, GlobalBridge, WhisperError, WhisperWire};

const EVENT_BUFFER: usize = 256;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // Logging is configured from the file, so load it before anything logs.
    let mut app = match WhisperWire::load(&config.config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::init_logger(config.verbose, &app.context().logging) {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("Starting whisperwire");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if config.dry_run {
        print_summary(&app);
        return;
    }

    if let Err(e) = run(&mut app, &config).await {
        tracing::error!(
            "❌ WhisperWire failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        app.shutdown();
        let exit_code = exit_code(&e);
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(app: &mut WhisperWire, config: &CliConfig) -> Result<(), WhisperError> {
    app.start().await?;

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    // Detached: a pending stdin read must not hold the process open on exit.
    console_events(tx)?;

    let mut bridge =
        GlobalBridge::start(app.context(), app.bot(), Arc::new(ConsoleAudience), rx).await?;

    let monitor = Arc::new(SystemMonitor::new(config.monitor, bridge.bridge().stats()));
    let reporter = if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
        monitor.log_stats("startup");
        Some(monitor.clone().spawn_reporter(Duration::from_secs(
            config.monitor_interval_secs.max(1),
        )))
    } else {
        None
    };

    tracing::info!("✅ Relay running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    if let Some(reporter) = reporter {
        reporter.abort();
    }
    monitor.log_stats("shutdown");
    bridge.stop();
    app.shutdown();
    Ok(())
}

fn print_summary(app: &WhisperWire) {
    let ctx = app.context();
    println!("✅ Configuration is valid");
    println!("   Guild:          {}", ctx.discord.guild_id);
    println!("   Chat channel:   {}", ctx.discord.chat_channel_id);
    println!(
        "   Events channel: {}",
        ctx.discord.events_channel_id().unwrap_or("(chat channel)")
    );
    println!("   Chat bridge:    {}", ctx.minecraft.enable_chat_bridge);
    println!("   Join/leave:     {}", ctx.minecraft.show_join_leave);
    println!(
        "   Delivery:       {}",
        if ctx.webhook.url.is_some() { "webhook" } else { "bot" }
    );
    println!("   Poll interval:  {:?}", ctx.discord.poll_interval());
}

fn exit_code(error: &WhisperError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
