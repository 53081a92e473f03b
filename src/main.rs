use clap::Parser;
use prime_screener::config::profile::ScreenProfile;
use prime_screener::notify::mail::SmtpNotifier;
use prime_screener::utils::{logger, validation::Validate};
use prime_screener::{CliConfig, LocalStorage, MailSettings, ScreenerEngine, ScreenerPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting prime-screener CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let profile = match &config.profile {
        Some(path) => match ScreenProfile::from_file(path) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!("❌ Failed to load screen profile: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        },
        None => ScreenProfile::default(),
    };

    if let Err(e) = profile.validate() {
        tracing::error!("❌ Screen profile validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mail = MailSettings::from_env(&config, &profile.mail);
    if mail.is_none() {
        tracing::warn!("GMAIL_USER / GMAIL_APP_PASSWORD not set, mail delivery disabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let notifier = SmtpNotifier::new(mail);
    let pipeline = ScreenerPipeline::new(storage, config, &profile);

    let engine = ScreenerEngine::new_with_monitoring(pipeline, notifier, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Screening run completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Screening run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Screening run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                prime_screener::utils::error::ErrorSeverity::Low => 0,
                prime_screener::utils::error::ErrorSeverity::Medium => 2,
                prime_screener::utils::error::ErrorSeverity::High => 1,
                prime_screener::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
