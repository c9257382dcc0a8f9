//! crates/mendi_core/src/crisis.rs
//!
//! Crisis keyword detection and the static emergency resource list.

use crate::domain::{CrisisCategory, CrisisCheck, CrisisKeyword, CrisisSeverity, EmergencyResource};
use tracing::warn;

use CrisisCategory::*;
use CrisisSeverity::*;

/// Keyword table, scanned in order. Earlier entries win severity ties.
pub const CRISIS_KEYWORDS: &[CrisisKeyword] = &[
    CrisisKeyword { keyword: "suicide", severity: Critical, category: Suicide },
    CrisisKeyword { keyword: "kill myself", severity: Critical, category: Suicide },
    CrisisKeyword { keyword: "end it all", severity: High, category: Suicide },
    CrisisKeyword { keyword: "self harm", severity: High, category: SelfHarm },
    CrisisKeyword { keyword: "hurt myself", severity: High, category: SelfHarm },
    CrisisKeyword { keyword: "cutting", severity: Medium, category: SelfHarm },
    CrisisKeyword { keyword: "hopeless", severity: Medium, category: MentalHealth },
    CrisisKeyword { keyword: "worthless", severity: Medium, category: MentalHealth },
    CrisisKeyword { keyword: "panic attack", severity: Medium, category: MentalHealth },
];

pub fn emergency_resources() -> Vec<EmergencyResource> {
    vec![
        EmergencyResource {
            name: "National Suicide Prevention Lifeline".to_string(),
            phone: Some("988".to_string()),
            text: Some("741741".to_string()),
            website: "https://suicidepreventionlifeline.org".to_string(),
            description: "24/7 crisis support for suicide prevention".to_string(),
            available_24x7: true,
            country: "US".to_string(),
        },
        EmergencyResource {
            name: "Crisis Text Line".to_string(),
            phone: None,
            text: Some("741741".to_string()),
            website: "https://crisistextline.org".to_string(),
            description: "Text HOME to 741741 for crisis support".to_string(),
            available_24x7: true,
            country: "US".to_string(),
        },
        EmergencyResource {
            name: "SAMHSA National Helpline".to_string(),
            phone: Some("1-800-662-4357".to_string()),
            text: None,
            website: "https://samhsa.gov".to_string(),
            description: "Mental health and substance abuse treatment".to_string(),
            available_24x7: true,
            country: "US".to_string(),
        },
    ]
}

/// True iff the severity warrants the emergency banner (high or critical).
pub fn should_show_emergency_banner(severity: Option<CrisisSeverity>) -> bool {
    matches!(severity, Some(High) | Some(Critical))
}

/// The severity-graded advisory sentence shown next to crisis resources.
pub fn crisis_advisory(severity: Option<CrisisSeverity>) -> String {
    let base = "I'm concerned about what you've shared. Your wellbeing is important, and there are people who want to help.";
    match severity {
        Some(Critical) => format!("{} Please reach out to a crisis helpline immediately. If you're in immediate danger, please call emergency services (911).", base),
        Some(High) => format!("{} I strongly encourage you to speak with a mental health professional or crisis counselor.", base),
        Some(Medium) => format!("{} Consider talking to someone you trust or a mental health professional about these feelings.", base),
        _ => format!("{} Remember that seeking help is a sign of strength, not weakness.", base),
    }
}

/// Scans text against a fixed keyword table.
#[derive(Debug, Clone)]
pub struct CrisisDetector {
    keywords: &'static [CrisisKeyword],
    resources: Vec<EmergencyResource>,
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(CRISIS_KEYWORDS, emergency_resources())
    }
}

impl CrisisDetector {
    pub fn new(keywords: &'static [CrisisKeyword], resources: Vec<EmergencyResource>) -> Self {
        Self { keywords, resources }
    }

    /// Case-insensitive substring scan. No stemming or negation handling:
    /// "not suicidal" still matches.
    pub fn detect(&self, text: &str) -> CrisisCheck {
        let lower = text.to_lowercase();
        let matched: Vec<&CrisisKeyword> = self
            .keywords
            .iter()
            .filter(|k| lower.contains(&k.keyword.to_lowercase()))
            .collect();

        // Strictly greater keeps the first-seen entry on ties.
        let Some(worst) = matched.iter().copied().reduce(|max, curr| {
            if curr.severity > max.severity {
                curr
            } else {
                max
            }
        }) else {
            return CrisisCheck::none();
        };

        warn!(
            severity = worst.severity.as_str(),
            category = worst.category.as_str(),
            "Crisis keywords detected in user message"
        );

        CrisisCheck {
            detected: true,
            severity: Some(worst.severity),
            keywords: matched.iter().map(|k| k.keyword.to_string()).collect(),
            category: Some(worst.category),
        }
    }

    /// Every resource is returned whatever the category.
    pub fn emergency_resources(&self, _category: Option<CrisisCategory>) -> Vec<EmergencyResource> {
        self.resources.clone()
    }
}
