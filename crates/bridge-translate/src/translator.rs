//! Message Translation - Requests into tasks, payloads into friendly messages
//!
//! Two directions:
//! - `to_task`: a classified end-user request becomes a task specification
//!   for the producer (title, description, requirements, estimate)
//! - `translate` / `to_message`: a risk-scored producer payload becomes a
//!   consumer-safe message with tone and next steps
//!
//! High and critical payloads never contribute text: they always produce
//! the fixed "still working on it" message.

use std::sync::Arc;

use bridge_core::{
    BridgeError, BridgeResult, ClassifiedRequest, Complexity, EmotionalTone, Intent,
    MessageTone, Payload, RiskAssessment, RiskLevel, TaskSpecification, TranslatedMessage,
};
use bridge_safety::SafetyFilter;
use serde_json::Value;
use tracing::{debug, warn};

use crate::normalize::padded_words;

/// Shown instead of any high or critical payload
pub const WORKING_ON_IT_MESSAGE: &str =
    "Jag arbetar fortfarande på det här. Allt är under kontroll och jag hör av mig så snart nästa steg är klart.";

/// Shown when translation itself fails
pub const FALLBACK_MESSAGE: &str =
    "Jag behöver en liten stund till för att få ordning på det här. Jag återkommer snart.";

/// Confidence of the fallback message
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Readable message length band, in characters
const READABLE_LENGTH: std::ops::RangeInclusive<usize> = 20..=200;

/// String fields checked, in order, for the human-readable part of a payload
const TEXT_FIELDS: &[&str] = &["message", "text", "status", "result", "summary"];

const BASE_REQUIREMENTS: &[&str] = &[
    "Fungerar på både mobil och dator",
    "Tydligt och lättanvänt gränssnitt",
    "Inga tekniska meddelanden visas för användaren",
];

const STOP_WORDS: &[&str] = &[
    "och", "att", "det", "som", "med", "för", "den", "ett", "jag", "vill", "kan", "mig", "min",
    "the", "and", "for", "with", "please", "snälla", "want",
];

const COMPLETION_WORDS: &[&str] = &[
    " klar ", " klart ", " färdig", " done ", " complete", " finished ", " success",
    " lyckades ", " lyckats ", " publicerad", " deployed ", " ready ",
];

const PROBLEM_WORDS: &[&str] = &[
    " problem", " fel ", " felet ", " fail", " kunde inte ", " could not ", " couldn t ",
    " unable ", " issue", " warning", " varning", " error", " exception", " hinder ",
];

const PROGRESS_WORDS: &[&str] = &[
    " pågår ", " working ", " arbetar ", " steg ", " step ", " started ", " startat ",
    " processing ", " bearbetar ", " progress", " procent ", " percent ",
];

fn intent_title(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::CreateApp => Some("Ny app"),
        Intent::CreateWebsite => Some("Ny hemsida"),
        Intent::CreateGame => Some("Nytt spel"),
        Intent::FixProblem => Some("Rätta till ett problem"),
        Intent::ImproveDesign => Some("Snyggare design"),
        Intent::AddFeature => Some("Ny funktion"),
        Intent::Explain => Some("Förklaring"),
        Intent::Deploy => Some("Publicering"),
        Intent::CreateGeneric | Intent::Help | Intent::Unknown => None,
    }
}

fn intent_label(intent: Intent) -> &'static str {
    match intent {
        Intent::CreateApp => "Skapa en app",
        Intent::CreateWebsite => "Skapa en hemsida",
        Intent::CreateGame => "Skapa ett spel",
        Intent::FixProblem => "Åtgärda ett problem",
        Intent::ImproveDesign => "Förbättra designen",
        Intent::AddFeature => "Lägg till en funktion",
        Intent::Explain => "Förklara något",
        Intent::Deploy => "Publicera resultatet",
        Intent::CreateGeneric => "Skapa något nytt",
        Intent::Help => "Hjälp användaren vidare",
        Intent::Unknown => "Tolka och genomför önskemålet",
    }
}

fn intent_requirements(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::CreateApp => &[
            "Startskärm med tydlig navigering",
            "Sparar användarens uppgifter mellan besök",
            "Snabb uppstart",
        ],
        Intent::CreateWebsite => &[
            "Responsiv layout",
            "Kontaktuppgifter syns tydligt",
            "Sökmotorvänlig struktur",
        ],
        Intent::CreateGame => &[
            "Enkla kontroller",
            "Poängräkning",
            "Går att starta om efter en runda",
        ],
        Intent::FixProblem => &[
            "Återskapa och åtgärda problemet",
            "Kontrollera att inget annat slutat fungera",
        ],
        Intent::ImproveDesign => &["Konsekvent färgschema", "Lättläst typografi"],
        Intent::AddFeature => &[
            "Den nya funktionen passar in i befintligt flöde",
            "Befintliga funktioner påverkas inte",
        ],
        Intent::Explain => &["Förklaring utan fackspråk"],
        Intent::Deploy => &[
            "Den publicerade versionen nås via en länk",
            "Enkel väg tillbaka till föregående version",
        ],
        Intent::CreateGeneric | Intent::Help | Intent::Unknown => &[],
    }
}

fn complexity_requirements(complexity: Complexity) -> &'static [&'static str] {
    match complexity {
        Complexity::Low => &[],
        Complexity::Medium => &[
            "Formulär och listor kontrolleras innan de skickas",
            "Tydliga laddningsindikatorer",
        ],
        Complexity::High => &[
            "Säker inloggning och lagring av uppgifter",
            "Trygg hantering av betalningar och känsliga uppgifter",
            "Automatiska tester för de viktigaste flödena",
            "Säkerhetskopiering av användarnas data",
        ],
    }
}

fn complexity_label(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Low => "låg",
        Complexity::Medium => "medel",
        Complexity::High => "hög",
    }
}

fn base_minutes(complexity: Complexity) -> u32 {
    match complexity {
        Complexity::Low => 30,
        Complexity::Medium => 120,
        Complexity::High => 480,
    }
}

fn tone_line(tone: EmotionalTone) -> &'static str {
    match tone {
        EmotionalTone::Neutral => "Leverera ett tydligt och stabilt resultat.",
        EmotionalTone::Excited => "Användaren är entusiastisk, så gör resultatet roligt att använda.",
        EmotionalTone::Concerned => "Användaren är osäker, så förklara varje steg lugnt.",
        EmotionalTone::Frustrated => "Användaren är frustrerad, så prioritera en fungerande lösning snabbt.",
    }
}

fn closing_phrase(tone: MessageTone) -> &'static str {
    match tone {
        MessageTone::Celebratory => "Bra jobbat, det här blev riktigt bra!",
        MessageTone::Supportive => "Ingen fara, jag tar hand om det.",
        MessageTone::Informative => "Jag håller dig uppdaterad.",
        MessageTone::Encouraging => "Det går framåt, snart är vi där!",
    }
}

fn next_steps_for(tone: MessageTone) -> Vec<String> {
    let steps: &[&str] = match tone {
        MessageTone::Celebratory => &["Testa resultatet", "Berätta om du vill ändra något"],
        MessageTone::Supportive => &["Jag provar en annan väg", "Du behöver inte göra något just nu"],
        MessageTone::Informative | MessageTone::Encouraging => &[],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

fn estimated_time_for(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Low => "några minuter",
        Complexity::Medium => "en liten stund",
        Complexity::High => "lite längre tid",
    }
}

/// Human-readable duration for an estimate in minutes
pub fn duration_label(minutes: u32) -> String {
    if minutes < 60 {
        format!("cirka {} minuter", minutes)
    } else if minutes < 480 {
        let hours = (minutes as f32 / 60.0).round() as u32;
        if hours == 1 {
            "cirka 1 timme".to_string()
        } else {
            format!("cirka {} timmar", hours)
        }
    } else {
        let days = (minutes as f32 / 480.0).ceil() as u32;
        if days == 1 {
            "cirka 1 arbetsdag".to_string()
        } else {
            format!("cirka {} arbetsdagar", days)
        }
    }
}

/// First three significant words, first letter capitalized
fn title_from_text(text: &str) -> String {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() >= 3)
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .take(3)
        .collect();

    if words.is_empty() {
        return "Ny uppgift".to_string();
    }

    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => joined,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn capitalize_sentence(text: &str) -> String {
    let mut chars = text.chars();
    let mut out: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

/// Translator between end-user language and producer output
pub struct MessageTranslator {
    filter: Arc<SafetyFilter>,
}

impl MessageTranslator {
    pub fn new(filter: Arc<SafetyFilter>) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &SafetyFilter {
        &self.filter
    }

    /// Turn a classified request into a task specification
    pub fn to_task(&self, request: &ClassifiedRequest) -> TaskSpecification {
        let title = intent_title(request.intent)
            .map(str::to_string)
            .unwrap_or_else(|| title_from_text(&request.original_text));

        let mut description = format!(
            "{} ({} komplexitet). {}",
            intent_label(request.intent),
            complexity_label(request.complexity),
            tone_line(request.emotional_tone)
        );
        let original = request.original_text.trim();
        if !original.is_empty() {
            description.push_str(&format!(" Önskemål: \"{}\"", original));
        }

        let requirements: Vec<String> = BASE_REQUIREMENTS
            .iter()
            .chain(intent_requirements(request.intent))
            .chain(complexity_requirements(request.complexity))
            .map(|r| r.to_string())
            .collect();

        let mut estimated_minutes = base_minutes(request.complexity);
        if requirements.len() > 8 {
            estimated_minutes = (estimated_minutes as f32 * 1.5).round() as u32;
        }

        let mut confidence: f32 = 0.5;
        if request.intent.is_known() {
            confidence += 0.2;
        }
        if request.complexity > Complexity::Low {
            confidence += 0.1;
        }
        if requirements.len() >= 6 {
            confidence += 0.1;
        }

        debug!(
            intent = %request.intent,
            requirements = requirements.len(),
            estimated_minutes,
            "Built task specification"
        );

        TaskSpecification {
            title,
            description,
            requirements,
            estimated_minutes,
            estimated_duration: duration_label(estimated_minutes),
            confidence: confidence.min(1.0),
            intent: request.intent,
            complexity: request.complexity,
        }
    }

    /// Translate a scored producer payload.
    ///
    /// Returns an error when no consumer-safe text can be produced; callers
    /// decide the fallback (see [`MessageTranslator::fallback`]).
    pub fn translate(
        &self,
        payload: &Payload,
        assessment: &RiskAssessment,
        request: Option<&ClassifiedRequest>,
    ) -> BridgeResult<TranslatedMessage> {
        if assessment.risk_level.requires_approval() {
            let next_steps: Vec<String> = [
                "Jag provar en alternativ lösning",
                "Du behöver inte göra något just nu",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect();
            let message = WORKING_ON_IT_MESSAGE.to_string();
            let confidence = Self::confidence(assessment.risk_level, &message, !next_steps.is_empty());

            return Ok(TranslatedMessage {
                message,
                tone: MessageTone::Supportive,
                next_steps,
                needs_approval: true,
                estimated_time: request.map(|r| estimated_time_for(r.complexity).to_string()),
                confidence,
                warning: false,
            });
        }

        let source = Self::extract_text(payload)?;
        let redacted = self.filter.redact_text(&source);
        let body = redacted.text.trim();
        if body.is_empty() {
            return Err(BridgeError::translation("nothing left to say after redaction"));
        }

        let tone = Self::pick_tone(&source);
        let message = format!("{} {}", capitalize_sentence(body), closing_phrase(tone));

        let residual = self.filter.classifier().assess_text(&message);
        if !residual.matched_terms.is_empty() {
            warn!(
                residual = %residual.risk_level,
                terms = residual.matched_terms.len(),
                "Redacted message still carries technical vocabulary"
            );
            return Err(BridgeError::translation(format!(
                "{} technical term(s) survived redaction",
                residual.matched_terms.len()
            )));
        }

        let next_steps = next_steps_for(tone);
        let confidence = Self::confidence(assessment.risk_level, &message, !next_steps.is_empty());

        Ok(TranslatedMessage {
            message,
            tone,
            next_steps,
            needs_approval: false,
            estimated_time: request.map(|r| estimated_time_for(r.complexity).to_string()),
            confidence,
            warning: false,
        })
    }

    /// Translate, substituting the fallback message on failure. Never fails.
    pub fn to_message(
        &self,
        payload: &Payload,
        assessment: &RiskAssessment,
        request: Option<&ClassifiedRequest>,
    ) -> TranslatedMessage {
        match self.translate(payload, assessment, request) {
            Ok(message) => message,
            Err(e) => {
                warn!("Translation failed, using fallback message: {}", e);
                Self::fallback(assessment)
            }
        }
    }

    /// Generic supportive message used when translation fails
    pub fn fallback(assessment: &RiskAssessment) -> TranslatedMessage {
        TranslatedMessage {
            message: FALLBACK_MESSAGE.to_string(),
            tone: MessageTone::Supportive,
            next_steps: Vec::new(),
            needs_approval: assessment.needs_approval(),
            estimated_time: None,
            confidence: FALLBACK_CONFIDENCE,
            warning: true,
        }
    }

    /// Human-readable text of a payload (before redaction)
    fn extract_text(payload: &Payload) -> BridgeResult<String> {
        match payload {
            Payload::Text(text) => Ok(text.clone()),
            Payload::Structured(value) => {
                if let Some(text) = value.as_object().and_then(|map| {
                    TEXT_FIELDS
                        .iter()
                        .find_map(|field| map.get(*field).and_then(Value::as_str))
                }) {
                    return Ok(text.to_string());
                }
                let mut parts = Vec::new();
                collect_strings(value, &mut parts);
                if parts.is_empty() {
                    Err(BridgeError::translation("payload has no readable text"))
                } else {
                    Ok(parts.join(". "))
                }
            }
        }
    }

    fn pick_tone(source: &str) -> MessageTone {
        let words = padded_words(source);
        if contains_any(&words, COMPLETION_WORDS) {
            MessageTone::Celebratory
        } else if contains_any(&words, PROBLEM_WORDS) {
            MessageTone::Supportive
        } else if contains_any(&words, PROGRESS_WORDS) {
            MessageTone::Informative
        } else {
            MessageTone::Encouraging
        }
    }

    fn confidence(level: RiskLevel, message: &str, has_next_steps: bool) -> f32 {
        let mut confidence: f32 = 0.6;
        match level {
            RiskLevel::None => confidence += 0.2,
            RiskLevel::Low => confidence += 0.1,
            _ => {}
        }
        if READABLE_LENGTH.contains(&message.chars().count()) {
            confidence += 0.1;
        }
        if has_next_steps {
            confidence += 0.1;
        }
        confidence.min(1.0)
    }
}

/// Non-empty strings outside technical fields, in document order
fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => {
            for (key, child) in map {
                if !bridge_safety::is_technical_key(key) {
                    collect_strings(child, out);
                }
            }
        }
        _ => {}
    }
}
