use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{NarratorConfig, NarratorMode};
use crate::errors::LlmError;
use crate::external::text_backend::{build_roster, TextBackend};
use crate::models::{NarrativeResult, NarrativeSource, Vibe};

pub const DRAGON_OF_DEBT: &str = "The Dragon of Debt has burned the village! Panic spreads.";
pub const ORCS_GATHERING: &str = "Scouts report orcs gathering at the border. Unease grows.";
pub const KINGS_FESTIVAL: &str = "The King announces a grand festival! Gold flows freely.";
pub const GOOD_HARVEST: &str = "A good harvest season. The merchants are happy.";
pub const CALM_WIND: &str = "The wind is calm. The Kingdom waits.";

pub const ARCHIVES_SEALED: &str = "The Royal Archives are sealed. No scribe may read the omens today.";
pub const STARS_SILENT: &str = "The stars are silent. Even the oracles cannot read this day.";

/// Turns a day's percent price change into a line of in-world narration
#[async_trait]
pub trait Narrator: Send + Sync {
    fn mode(&self) -> NarratorMode;

    async fn narrate(&self, change: f64) -> NarrativeResult;
}

/// First matching band wins. The bands cover the whole real line.
pub fn narrate_by_rules(change: f64) -> &'static str {
    if change < -3.0 {
        DRAGON_OF_DEBT
    } else if change < -1.0 {
        ORCS_GATHERING
    } else if change > 3.0 {
        KINGS_FESTIVAL
    } else if change > 1.0 {
        GOOD_HARVEST
    } else {
        CALM_WIND
    }
}

#[derive(Debug, Default)]
pub struct RuleBasedNarrator;

#[async_trait]
impl Narrator for RuleBasedNarrator {
    fn mode(&self) -> NarratorMode {
        NarratorMode::RuleBased
    }

    async fn narrate(&self, change: f64) -> NarrativeResult {
        NarrativeResult::new(narrate_by_rules(change), NarrativeSource::RuleTable)
    }
}

pub fn build_prompt(change: f64, vibe: Vibe) -> String {
    format!(
        "The kingdom's market moved {}% today. The mood is {}. \
         Describe what happens in the fantasy kingdom in one short, dramatic sentence. \
         Do not mention numbers, stocks or percentages.",
        change,
        vibe.label()
    )
}

/// Walks the model roster in order and keeps the first completion.
/// Without a credential the roster is never touched.
pub struct GenerativeNarrator {
    key_loaded: bool,
    roster: Vec<Arc<dyn TextBackend>>,
}

impl GenerativeNarrator {
    pub fn new(key_loaded: bool, roster: Vec<Arc<dyn TextBackend>>) -> Self {
        Self { key_loaded, roster }
    }

    pub fn from_config(config: &NarratorConfig) -> Result<Self, LlmError> {
        let roster = build_roster(config)?;
        if config.key_loaded() {
            info!(
                "Generative narrator ready with roster: {}",
                roster.iter().map(|b| b.id()).collect::<Vec<_>>().join(", ")
            );
        } else {
            warn!("LLM API key not configured. Narration falls back to sealed archives.");
        }
        Ok(Self::new(config.key_loaded(), roster))
    }

    pub fn is_configured(&self) -> bool {
        self.key_loaded
    }
}

#[async_trait]
impl Narrator for GenerativeNarrator {
    fn mode(&self) -> NarratorMode {
        NarratorMode::Generative
    }

    async fn narrate(&self, change: f64) -> NarrativeResult {
        if !self.key_loaded {
            return NarrativeResult::new(ARCHIVES_SEALED, NarrativeSource::Unconfigured);
        }

        let vibe = Vibe::from_change(change);
        let prompt = build_prompt(change, vibe);

        for backend in &self.roster {
            match backend.generate(&prompt).await {
                Ok(text) => {
                    let narrative = text.trim().to_string();
                    info!("🔮 Narrative from {}: {}", backend.id(), narrative);
                    return NarrativeResult::new(narrative, NarrativeSource::Model(backend.id().to_string()));
                }
                Err(e) => {
                    warn!("Backend {} failed, trying next: {}", backend.id(), e);
                }
            }
        }

        warn!("Every backend in the roster failed for change {}", change);
        NarrativeResult::new(STARS_SILENT, NarrativeSource::Exhausted)
    }
}

/// Picks the narration strategy once, at startup
pub fn build_narrator(config: &NarratorConfig) -> Result<Arc<dyn Narrator>, LlmError> {
    match config.mode {
        NarratorMode::RuleBased => {
            info!("Using rule-based narrator");
            Ok(Arc::new(RuleBasedNarrator))
        }
        NarratorMode::Generative => Ok(Arc::new(GenerativeNarrator::from_config(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedBackend {
        id: String,
        reply: Result<String, ()>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn ok(id: &str, text: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                reply: Err(()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextBackend for ScriptedBackend {
        fn id(&self) -> &str {
            &self.id
        }

        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|_| LlmError::ApiError("HTTP 503: overloaded".to_string()))
        }
    }

    fn roster(backends: &[Arc<ScriptedBackend>]) -> Vec<Arc<dyn TextBackend>> {
        backends.iter().map(|b| b.clone() as Arc<dyn TextBackend>).collect()
    }

    #[test]
    fn test_rule_bands() {
        assert_eq!(narrate_by_rules(-3.01), DRAGON_OF_DEBT);
        assert_eq!(narrate_by_rules(-42.0), DRAGON_OF_DEBT);
        assert_eq!(narrate_by_rules(-3.0), ORCS_GATHERING);
        assert_eq!(narrate_by_rules(-1.01), ORCS_GATHERING);
        assert_eq!(narrate_by_rules(-1.0), CALM_WIND);
        assert_eq!(narrate_by_rules(0.0), CALM_WIND);
        assert_eq!(narrate_by_rules(1.0), CALM_WIND);
        assert_eq!(narrate_by_rules(1.01), GOOD_HARVEST);
        assert_eq!(narrate_by_rules(3.0), GOOD_HARVEST);
        assert_eq!(narrate_by_rules(3.01), KINGS_FESTIVAL);
        assert_eq!(narrate_by_rules(18.5), KINGS_FESTIVAL);
    }

    #[tokio::test]
    async fn test_rule_based_narrator_reports_rule_source() {
        let result = RuleBasedNarrator.narrate(-5.0).await;
        assert_eq!(result.narrative, DRAGON_OF_DEBT);
        assert_eq!(result.source, NarrativeSource::RuleTable);
    }

    #[test]
    fn test_prompt_embeds_change_and_vibe() {
        let prompt = build_prompt(-4.25, Vibe::from_change(-4.25));
        assert!(prompt.contains("-4.25%"));
        assert!(prompt.contains("CHAOS"));

        let prompt = build_prompt(0.5, Vibe::from_change(0.5));
        assert!(prompt.contains("CALM"));
    }

    #[tokio::test]
    async fn test_unconfigured_returns_sealed_archives() {
        let backends = [ScriptedBackend::ok("model-a", "unused"), ScriptedBackend::failing("model-b")];
        let narrator = GenerativeNarrator::new(false, roster(&backends));
        assert!(!narrator.is_configured());

        for change in [-12.0, 0.0, 7.5] {
            let result = narrator.narrate(change).await;
            assert_eq!(result.narrative, ARCHIVES_SEALED);
            assert_eq!(result.source, NarrativeSource::Unconfigured);
        }
        assert!(backends.iter().all(|b| b.calls() == 0));
    }

    #[tokio::test]
    async fn test_first_success_wins_and_stops() {
        let first = ScriptedBackend::ok("model-a", "  The dragon stirs.\n");
        let second = ScriptedBackend::ok("model-b", "unused");
        let narrator = GenerativeNarrator::new(true, roster(&[first.clone(), second.clone()]));

        let result = narrator.narrate(-6.0).await;

        assert_eq!(result.narrative, "The dragon stirs.");
        assert_eq!(result.source, NarrativeSource::Model("model-a".to_string()));
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_failures_fall_through_in_order() {
        let first = ScriptedBackend::failing("model-a");
        let second = ScriptedBackend::failing("model-b");
        let third = ScriptedBackend::ok("model-c", "Merchants sing in the square.");
        let fourth = ScriptedBackend::ok("model-d", "unused");
        let narrator =
            GenerativeNarrator::new(true, roster(&[first.clone(), second.clone(), third.clone(), fourth.clone()]));

        let result = narrator.narrate(2.0).await;

        assert_eq!(result.source, NarrativeSource::Model("model-c".to_string()));
        assert_eq!(result.narrative, "Merchants sing in the square.");
        assert_eq!((first.calls(), second.calls(), third.calls(), fourth.calls()), (1, 1, 1, 0));
        assert_eq!(first.prompts.lock().unwrap()[0], third.prompts.lock().unwrap()[0]);
    }

    #[tokio::test]
    async fn test_all_backends_failing_returns_silent_stars() {
        let backends = [
            ScriptedBackend::failing("model-a"),
            ScriptedBackend::failing("model-b"),
            ScriptedBackend::failing("model-c"),
        ];
        let narrator = GenerativeNarrator::new(true, roster(&backends));

        let result = narrator.narrate(9.9).await;

        assert_eq!(result.narrative, STARS_SILENT);
        assert_eq!(result.source, NarrativeSource::Exhausted);
        assert!(backends.iter().all(|b| b.calls() == 1));
    }

    #[tokio::test]
    async fn test_empty_roster_with_key_is_exhausted() {
        let narrator = GenerativeNarrator::new(true, Vec::new());
        let result = narrator.narrate(0.0).await;
        assert_eq!(result.source, NarrativeSource::Exhausted);
    }

    #[test]
    fn test_build_narrator_respects_mode() {
        let rules = NarratorConfig {
            mode: NarratorMode::RuleBased,
            ..NarratorConfig::default()
        };
        assert_eq!(build_narrator(&rules).unwrap().mode(), NarratorMode::RuleBased);

        let generative = NarratorConfig::default();
        assert_eq!(build_narrator(&generative).unwrap().mode(), NarratorMode::Generative);
    }
}
