//! Request Classification - Intent, complexity, and emotional tone
//!
//! Three ordered pattern tables, each matched as substrings against the
//! normalized request text:
//! - intent: the FIRST matching row wins, so specific phrases are listed
//!   before generic ones ("skapa en app" before "skapa")
//! - complexity: EVERY matching row is considered and the HIGHEST level wins
//! - tone: the first matching row wins
//!
//! Intent and complexity resolve differently on purpose. Keep it that way:
//! complexity is a safety margin, intent is a best guess.

use bridge_core::{ClassifiedRequest, Complexity, EmotionalTone, Intent};
use tracing::debug;

use crate::normalize::{fold, padded_words};

/// One row of a pattern table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule<T> {
    pub pattern: String,
    pub tag: T,
}

impl<T: Copy> PatternRule<T> {
    fn from_table(table: &[(&str, T)]) -> Vec<Self> {
        table
            .iter()
            .map(|(pattern, tag)| Self {
                pattern: pattern.to_string(),
                tag: *tag,
            })
            .collect()
    }
}

/// Intent table, in precedence order. Patterns match against space-padded words.
pub const INTENT_PATTERNS: &[(&str, Intent)] = &[
    // Explicit app phrases
    ("skapa en app", Intent::CreateApp),
    ("skapa en enkel app", Intent::CreateApp),
    ("skapa app", Intent::CreateApp),
    ("bygg en app", Intent::CreateApp),
    ("bygga en app", Intent::CreateApp),
    ("gör en app", Intent::CreateApp),
    ("göra en app", Intent::CreateApp),
    ("create an app", Intent::CreateApp),
    ("build an app", Intent::CreateApp),
    ("make an app", Intent::CreateApp),
    // Websites and games
    ("hemsida", Intent::CreateWebsite),
    ("webbsida", Intent::CreateWebsite),
    ("webbplats", Intent::CreateWebsite),
    ("website", Intent::CreateWebsite),
    (" spel", Intent::CreateGame),
    (" game", Intent::CreateGame),
    // Problems
    ("fungerar inte", Intent::FixProblem),
    ("funkar inte", Intent::FixProblem),
    (" fixa", Intent::FixProblem),
    (" laga", Intent::FixProblem),
    (" bugg", Intent::FixProblem),
    ("not working", Intent::FixProblem),
    (" broken ", Intent::FixProblem),
    (" fix ", Intent::FixProblem),
    // Changes to something that exists
    ("snyggare", Intent::ImproveDesign),
    ("design", Intent::ImproveDesign),
    (" färg", Intent::ImproveDesign),
    ("layout", Intent::ImproveDesign),
    ("lägg till", Intent::AddFeature),
    ("lägga till", Intent::AddFeature),
    (" add ", Intent::AddFeature),
    ("publicera", Intent::Deploy),
    ("lansera", Intent::Deploy),
    (" deploy", Intent::Deploy),
    (" publish", Intent::Deploy),
    ("förklara", Intent::Explain),
    (" vad är ", Intent::Explain),
    ("hur fungerar", Intent::Explain),
    (" explain", Intent::Explain),
    // Generic fallbacks
    (" app ", Intent::CreateApp),
    (" appen ", Intent::CreateApp),
    (" skapa ", Intent::CreateGeneric),
    (" bygg", Intent::CreateGeneric),
    (" create ", Intent::CreateGeneric),
    (" build ", Intent::CreateGeneric),
    (" make ", Intent::CreateGeneric),
    (" hjälp", Intent::Help),
    (" help ", Intent::Help),
];

/// Complexity table. Order does not matter: the highest match wins.
pub const COMPLEXITY_PATTERNS: &[(&str, Complexity)] = &[
    ("enkel", Complexity::Low),
    ("enkla", Complexity::Low),
    (" liten ", Complexity::Low),
    (" litet ", Complexity::Low),
    (" simple ", Complexity::Low),
    (" basic ", Complexity::Low),
    (" small ", Complexity::Low),
    ("formulär", Complexity::Medium),
    ("kalender", Complexity::Medium),
    (" sök", Complexity::Medium),
    ("galleri", Complexity::Medium),
    (" meny", Complexity::Medium),
    ("flera sidor", Complexity::Medium),
    ("animation", Complexity::Medium),
    (" form ", Complexity::Medium),
    (" search", Complexity::Medium),
    ("gallery", Complexity::Medium),
    ("databas", Complexity::High),
    ("inloggning", Complexity::High),
    ("logga in", Complexity::High),
    ("betalning", Complexity::High),
    ("användarkonton", Complexity::High),
    ("realtid", Complexity::High),
    ("database", Complexity::High),
    (" login", Complexity::High),
    ("payment", Complexity::High),
    ("real time", Complexity::High),
    ("multiplayer", Complexity::High),
    ("integration", Complexity::High),
    (" api ", Complexity::High),
];

/// Tone table, first match wins. Patterns match against the folded raw text
/// padded with spaces, so punctuation is available.
pub const TONE_PATTERNS: &[(&str, EmotionalTone)] = &[
    ("fungerar inte", EmotionalTone::Frustrated),
    ("funkar inte", EmotionalTone::Frustrated),
    ("igen och igen", EmotionalTone::Frustrated),
    ("irriter", EmotionalTone::Frustrated),
    ("frustr", EmotionalTone::Frustrated),
    ("not working", EmotionalTone::Frustrated),
    ("annoying", EmotionalTone::Frustrated),
    (" ugh", EmotionalTone::Frustrated),
    ("orolig", EmotionalTone::Concerned),
    (" rädd", EmotionalTone::Concerned),
    ("osäker", EmotionalTone::Concerned),
    ("är det säkert", EmotionalTone::Concerned),
    ("hoppas att", EmotionalTone::Concerned),
    ("worried", EmotionalTone::Concerned),
    ("nervous", EmotionalTone::Concerned),
    ("afraid", EmotionalTone::Concerned),
    ("!", EmotionalTone::Excited),
    ("fantastisk", EmotionalTone::Excited),
    ("spännande", EmotionalTone::Excited),
    ("äntligen", EmotionalTone::Excited),
    (" kul", EmotionalTone::Excited),
    (" wow", EmotionalTone::Excited),
    (" super", EmotionalTone::Excited),
    ("awesome", EmotionalTone::Excited),
    ("amazing", EmotionalTone::Excited),
    ("excited", EmotionalTone::Excited),
];

/// Classifier for end-user requests
pub struct IntentClassifier {
    intents: Vec<PatternRule<Intent>>,
    complexity: Vec<PatternRule<Complexity>>,
    tones: Vec<PatternRule<EmotionalTone>>,
}

impl IntentClassifier {
    /// Create a classifier with the built-in tables
    pub fn new() -> Self {
        Self::with_tables(
            PatternRule::from_table(INTENT_PATTERNS),
            PatternRule::from_table(COMPLEXITY_PATTERNS),
            PatternRule::from_table(TONE_PATTERNS),
        )
    }

    /// Create a classifier with custom tables
    pub fn with_tables(
        intents: Vec<PatternRule<Intent>>,
        complexity: Vec<PatternRule<Complexity>>,
        tones: Vec<PatternRule<EmotionalTone>>,
    ) -> Self {
        Self {
            intents,
            complexity,
            tones,
        }
    }

    /// Classify a request. Never fails; misses resolve to the defaults.
    pub fn classify(&self, text: &str, prior_context_id: Option<&str>) -> ClassifiedRequest {
        let words = padded_words(text);
        let raw = format!(" {} ", fold(text));

        let request = ClassifiedRequest {
            original_text: text.to_string(),
            intent: self.detect_intent(&words),
            complexity: self.detect_complexity(&words),
            emotional_tone: self.detect_tone(&raw),
            prior_context_id: prior_context_id.map(str::to_string),
        };

        debug!(
            intent = %request.intent,
            complexity = %request.complexity,
            tone = %request.emotional_tone,
            "Classified request"
        );
        request
    }

    /// First matching row in table order
    pub fn detect_intent(&self, normalized: &str) -> Intent {
        self.intents
            .iter()
            .find(|rule| normalized.contains(rule.pattern.as_str()))
            .map(|rule| rule.tag)
            .unwrap_or_default()
    }

    /// Highest level among all matching rows
    pub fn detect_complexity(&self, normalized: &str) -> Complexity {
        self.complexity
            .iter()
            .filter(|rule| normalized.contains(rule.pattern.as_str()))
            .map(|rule| rule.tag)
            .max()
            .unwrap_or_default()
    }

    /// First matching row in table order
    pub fn detect_tone(&self, normalized: &str) -> EmotionalTone {
        self.tones
            .iter()
            .find(|rule| normalized.contains(rule.pattern.as_str()))
            .map(|rule| rule.tag)
            .unwrap_or_default()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> ClassifiedRequest {
        IntentClassifier::new().classify(text, None)
    }

    #[test]
    fn test_simple_app_request() {
        let req = classify("Skapa en enkel app");
        assert_eq!(req.intent, Intent::CreateApp);
        assert_eq!(req.complexity, Complexity::Low);
        assert_eq!(req.emotional_tone, EmotionalTone::Neutral);
    }

    #[test]
    fn test_high_complexity_terms_win() {
        let req = classify("databas med inloggning och betalning");
        assert_eq!(req.complexity, Complexity::High);

        // A low term does not pull the level down
        let req = classify("en enkel sida med databas");
        assert_eq!(req.complexity, Complexity::High);
    }

    #[test]
    fn test_empty_input_defaults() {
        let req = classify("");
        assert_eq!(req.intent, Intent::Unknown);
        assert_eq!(req.complexity, Complexity::Low);
        assert_eq!(req.emotional_tone, EmotionalTone::Neutral);
        assert_eq!(req.original_text, "");
    }

    #[test]
    fn test_specific_phrase_precedes_generic() {
        assert_eq!(classify("skapa en app åt mig").intent, Intent::CreateApp);
        assert_eq!(classify("skapa något roligt").intent, Intent::CreateGeneric);
    }

    #[test]
    fn test_first_match_not_longest_match() {
        // Both "hemsida" and "fungerar inte" occur; the website row comes first
        let req = classify("min hemsida fungerar inte");
        assert_eq!(req.intent, Intent::CreateWebsite);
        assert_eq!(req.emotional_tone, EmotionalTone::Frustrated);
    }

    #[test]
    fn test_custom_table_order_is_respected() {
        let intents = vec![
            PatternRule { pattern: "skapa".to_string(), tag: Intent::CreateGeneric },
            PatternRule { pattern: "skapa en app".to_string(), tag: Intent::CreateApp },
        ];
        let classifier = IntentClassifier::with_tables(intents, vec![], vec![]);
        assert_eq!(classifier.classify("skapa en app", None).intent, Intent::CreateGeneric);
    }

    #[test]
    fn test_complexity_is_highest_not_first() {
        let complexity = vec![
            PatternRule { pattern: "a".to_string(), tag: Complexity::Low },
            PatternRule { pattern: "b".to_string(), tag: Complexity::High },
            PatternRule { pattern: "c".to_string(), tag: Complexity::Medium },
        ];
        let classifier = IntentClassifier::with_tables(vec![], complexity, vec![]);
        assert_eq!(classifier.detect_complexity(" a b c "), Complexity::High);
        assert_eq!(classifier.detect_complexity(" a c "), Complexity::Medium);
        assert_eq!(classifier.detect_complexity(" x "), Complexity::Low);
    }

    #[test]
    fn test_word_boundaries() {
        // "knapp" must not read as "app", "besök" must not read as "sök"
        let req = classify("lägg till en knapp för besök");
        assert_eq!(req.intent, Intent::AddFeature);
        assert_eq!(req.complexity, Complexity::Low);
    }

    #[test]
    fn test_tones() {
        assert_eq!(classify("Jag är lite orolig").emotional_tone, EmotionalTone::Concerned);
        assert_eq!(classify("Gör ett spel!").emotional_tone, EmotionalTone::Excited);
        assert_eq!(classify("Gör ett spel!").intent, Intent::CreateGame);
    }

    #[test]
    fn test_prior_context_is_carried() {
        let req = IntentClassifier::new().classify("gör den snyggare", Some("ctx-42"));
        assert_eq!(req.intent, Intent::ImproveDesign);
        assert_eq!(req.prior_context_id.as_deref(), Some("ctx-42"));
    }

    #[test]
    fn test_deterministic() {
        let classifier = IntentClassifier::new();
        let text = "Bygg en app med kalender och inloggning!";
        assert_eq!(classifier.classify(text, None), classifier.classify(text, None));
    }
}
