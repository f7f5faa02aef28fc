use serde::{Serialize, Serializer};

/// Which generation path produced a narrative
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeSource {
    /// A roster backend, by model identifier
    Model(String),
    /// The fixed rule table
    RuleTable,
    /// No credential configured, nothing was called
    Unconfigured,
    /// Every roster backend failed
    Exhausted,
}

impl NarrativeSource {
    pub fn as_str(&self) -> &str {
        match self {
            NarrativeSource::Model(id) => id,
            NarrativeSource::RuleTable => "rules",
            NarrativeSource::Unconfigured => "none",
            NarrativeSource::Exhausted => "error",
        }
    }
}

impl std::fmt::Display for NarrativeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NarrativeSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeResult {
    pub narrative: String,
    pub source: NarrativeSource,
}

impl NarrativeResult {
    pub fn new(narrative: impl Into<String>, source: NarrativeSource) -> Self {
        Self {
            narrative: narrative.into(),
            source,
        }
    }
}

/// Coarse mood of a trading day, used to steer the generative prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vibe {
    Chaos,
    Calm,
}

impl Vibe {
    pub fn from_change(change: f64) -> Self {
        if change.abs() > 3.0 {
            Vibe::Chaos
        } else {
            Vibe::Calm
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Vibe::Chaos => "CHAOS",
            Vibe::Calm => "CALM",
        }
    }
}
