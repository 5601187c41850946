use anyhow::Context;
use clap::{Parser, Subcommand};
use language_utils::translation::{AUTO_DETECT, is_supported, supported_languages};
use language_utils::{CefrLevel, Language};
use lingo_client::{Config, EdgeClient, VerbEnricher, translate::DeepLTranslator};

#[derive(Parser)]
#[command(name = "lingo", about = "Verb enrichment, CEFR rewrites and translation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the language of a sentence and analyze its verbs.
    Enrich { sentence: String },
    /// Rewrite a sentence at CEFR levels.
    Cefr {
        sentence: String,
        /// Level to include; repeat for several. Defaults to all six.
        #[arg(long = "level")]
        levels: Vec<String>,
        /// Only the detected level and the next one up.
        #[arg(long)]
        dynamic: bool,
    },
    /// Translate text with DeepL.
    Translate {
        text: String,
        /// Two-letter code or language name.
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "auto")]
        from: String,
    },
}

/// Language names like "italian" become their two-letter code.
fn app_code(language: &str) -> &str {
    Language::from_name(language).map_or(language, |language| language.iso_639_1())
}

/// Resolve a `--from`/`--to` argument to a code DeepL accepts.
fn translation_code(language: &str, allow_auto: bool) -> anyhow::Result<&str> {
    let code = app_code(language);
    if !is_supported(code) || (code == AUTO_DETECT && !allow_auto) {
        anyhow::bail!(
            "Unsupported translation language {language}. Supported: {}",
            supported_languages().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(code)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Enrich { sentence } => {
            let enricher = VerbEnricher::from_config(&config)?;
            let data = enricher.enrich(&sentence).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Cefr {
            sentence,
            levels,
            dynamic,
        } => {
            let levels = levels
                .iter()
                .map(|level| {
                    CefrLevel::parse(level).with_context(|| format!("Unknown CEFR level {level}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let response = EdgeClient::new(config)
                .fetch_cefr_levels(&sentence, &levels, dynamic)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Translate { text, to, from } => {
            let source = translation_code(&from, true)?;
            let target = translation_code(&to, false)?;
            let translation = DeepLTranslator::new(&config)
                .translate(&text, source, target)
                .await?;
            println!("{}", translation.text);
            if let Some(detected) = translation.detected_source_language {
                log::info!("Detected source language: {detected}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_code_accepts_names_and_codes() {
        assert_eq!(translation_code("italian", false).unwrap(), "it");
        assert_eq!(translation_code("nl", false).unwrap(), "nl");
        assert_eq!(translation_code("auto", true).unwrap(), "auto");
    }

    #[test]
    fn test_translation_code_rejects_unsupported() {
        assert!(translation_code("klingon", true).is_err());
        // Auto detection only makes sense for the source.
        assert!(translation_code("auto", false).is_err());
    }
}
