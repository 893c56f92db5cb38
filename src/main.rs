use anyhow::Result;
use dynamic_translation::config::Config;
use dynamic_translation::host::{
    dispatch_command, next_language, translate_message, CommandOutcome, SystemTerms, TextLookup,
    TranslatedLookup,
};
use dynamic_translation::i18n::LanguageRegistry;
use dynamic_translation::session::{LanguageSwitch, TranslationManager};
use dynamic_translation::source::{source_for_path, AnySource};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the variables are set by the host)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dynamic_translation=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting translation session");

    let config = Config::from_env();
    info!(
        "Translation files under '{}', mode {}",
        config.translation_path, config.mode
    );

    let source = source_for_path(&config.translation_path, config.fetch_timeout)?;
    let system_data_path = config.system_data_path.clone();
    let manager = Arc::new(TranslationManager::new(config, source));

    manager.subscribe_fn(|| {
        info!("Refreshing translated windows");
        Ok(())
    });

    let terms = match system_data_path {
        Some(path) => match SystemTerms::from_file(&path).await {
            Ok(terms) => terms,
            Err(e) => {
                warn!("Built-in terms unavailable: {:#}", e);
                SystemTerms::default()
            }
        },
        None => SystemTerms::default(),
    };
    let lookup = TranslatedLookup::new(terms, Arc::clone(&manager));

    let available = manager.initialize().await;
    info!(
        "Ready: {} ({} languages available)",
        LanguageRegistry::get().display_name(manager.current_language().as_str()),
        available.len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let output = handle_line(&manager, &lookup, &line).await?;
        println!("{}", output);
    }

    info!("Input closed, shutting down");
    Ok(())
}

/// Handle one line of input.
///
/// `SetLanguage <code>` switches language, `:`-prefixed lines query the
/// session and anything else is translated as message text. A literal `\n`
/// in the input stands for a line break.
async fn handle_line(
    manager: &TranslationManager<AnySource>,
    lookup: &TranslatedLookup<SystemTerms, AnySource>,
    line: &str,
) -> Result<String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let output = match command {
        ":status" => serde_json::to_string_pretty(&manager.status())?,
        ":next" => {
            let current = manager.current_language();
            match next_language(&current, &manager.available_languages()) {
                Some(next) => describe_switch(manager.set_language(&next).await, manager),
                None => "no languages available".to_string(),
            }
        }
        ":basic" => lookup.basic(parse_id(&args)),
        ":param" => lookup.param(parse_id(&args)),
        ":command" => lookup.command(parse_id(&args)),
        ":message" => lookup.message(args.first().copied().unwrap_or_default()),
        ":currency" => lookup.currency_unit(),
        _ => match dispatch_command(manager, command, &args).await {
            CommandOutcome::Language(switch) => describe_switch(switch, manager),
            CommandOutcome::Ignored => translate_message(manager, &line.replace("\\n", "\n")),
        },
    };

    Ok(output)
}

fn parse_id(args: &[&str]) -> usize {
    args.first().and_then(|id| id.parse().ok()).unwrap_or(0)
}

fn describe_switch(switch: LanguageSwitch, manager: &TranslationManager<AnySource>) -> String {
    let current = manager.current_language();
    let name = LanguageRegistry::get().display_name(current.as_str());
    match switch {
        LanguageSwitch::Unchanged => format!("already using {} ({})", name, current),
        LanguageSwitch::Switched(report) => format!(
            "switched to {} ({}), {} windows refreshed",
            name, current, report.delivered
        ),
        LanguageSwitch::Failed(e) => format!("still using {} ({}): {}", name, current, e),
    }
}
