//! crates/mendi_core/src/emotion.rs
//!
//! Emotion scoring. A keyword heuristic runs locally; when a remote analyst is
//! wired in it is tried first and any failure falls back to the heuristic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Emotion, EmotionCategory, EmotionalAnalysis};
use crate::ports::EmotionAnalysisService;

/// Keyword sets per category. On equal scores the later category wins.
const EMOTION_KEYWORDS: &[(EmotionCategory, &[&str])] = &[
    (
        EmotionCategory::Joy,
        &["happy", "excited", "joyful", "pleased", "delighted", "cheerful", "glad", "thrilled"],
    ),
    (
        EmotionCategory::Sadness,
        &["sad", "depressed", "down", "upset", "disappointed", "heartbroken", "gloomy"],
    ),
    (
        EmotionCategory::Anger,
        &["angry", "furious", "mad", "annoyed", "frustrated", "irritated", "enraged"],
    ),
    (
        EmotionCategory::Fear,
        &["scared", "afraid", "anxious", "worried", "nervous", "terrified", "panic"],
    ),
    (
        EmotionCategory::Surprise,
        &["surprised", "shocked", "amazed", "astonished", "stunned", "bewildered"],
    ),
    (
        EmotionCategory::Disgust,
        &["disgusted", "revolted", "repulsed", "sick", "nauseated", "appalled"],
    ),
];

pub const LOCAL_ANALYSIS_CONTEXT: &str = "Basic keyword-based analysis";

/// Scores text against the keyword sets without any I/O.
///
/// Occurrences are counted as non-overlapping substrings of the lowercased text,
/// so "sad" also counts inside "saddened". Words are the pieces between single
/// spaces, so a doubled space adds an empty word. A text without any match reads
/// as neutral with zero intensity.
pub fn analyze_locally(text: &str, now: DateTime<Utc>) -> EmotionalAnalysis {
    let lower = text.to_lowercase();
    let scores: Vec<(EmotionCategory, usize)> = EMOTION_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let count = keywords.iter().map(|k| lower.matches(k).count()).sum();
            (*category, count)
        })
        .collect();

    let words = text.split(' ').count().max(1) as f32;
    let intensity_of = |count: usize| (count as f32 / words * 10.0).min(1.0);

    let best = last_max(scores.iter().copied());
    let (primary, primary_count) = match best {
        Some((category, count)) if count > 0 => (category, count),
        _ => (EmotionCategory::Neutral, 0),
    };

    let secondary = last_max(scores.iter().copied().filter(|(c, _)| *c != primary))
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| Emotion {
            name: category.as_str().to_string(),
            category,
            intensity: intensity_of(count),
            description: format!("Secondary emotion with {} keyword matches", count),
        });

    let intensity = intensity_of(primary_count);
    EmotionalAnalysis {
        primary: Emotion {
            name: primary.as_str().to_string(),
            category: primary,
            intensity,
            description: format!("Detected {} with {} keyword matches", primary.as_str(), primary_count),
        },
        secondary,
        intensity,
        confidence: if intensity > 0.0 { 0.6 } else { 0.3 },
        context: LOCAL_ANALYSIS_CONTEXT.to_string(),
        timestamp: now,
    }
}

/// Highest score, keeping the latest entry on ties.
fn last_max(
    scores: impl Iterator<Item = (EmotionCategory, usize)>,
) -> Option<(EmotionCategory, usize)> {
    scores.fold(None, |best, curr| match best {
        Some((_, count)) if count > curr.1 => best,
        _ => Some(curr),
    })
}

/// Chooses between the remote analyst and the local heuristic per call.
#[derive(Clone, Default)]
pub struct EmotionAnalyzer {
    remote: Option<Arc<dyn EmotionAnalysisService>>,
}

impl EmotionAnalyzer {
    pub fn new(remote: Option<Arc<dyn EmotionAnalysisService>>) -> Self {
        Self { remote }
    }

    pub fn local() -> Self {
        Self { remote: None }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Always yields a complete analysis. Remote failures are logged and the
    /// heuristic answers for that single call; there is no retry.
    pub async fn analyze(&self, text: &str) -> EmotionalAnalysis {
        let Some(remote) = &self.remote else {
            return analyze_locally(text, Utc::now());
        };

        match remote.analyze_emotion(text).await {
            Ok(reading) => {
                debug!(primary = %reading.primary.name, "Remote emotion analysis succeeded");
                reading.into_analysis(Utc::now())
            }
            Err(e) => {
                warn!("Advanced analysis failed, falling back to basic analysis: {}", e);
                analyze_locally(text, Utc::now())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RemoteEmotion;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn happy_and_excited_reads_as_joy() {
        let analysis = analyze_locally("I am so happy and excited today", Utc::now());
        assert_eq!(analysis.primary.category, EmotionCategory::Joy);
        assert_eq!(analysis.primary.name, "joy");
        assert_eq!(analysis.intensity, 1.0);
        assert_eq!(analysis.confidence, 0.6);
        assert!(analysis.secondary.is_none());
    }

    #[test]
    fn intensity_scales_with_word_count() {
        let text = "today at work I was a little bit worried about the quarterly review numbers again";
        let analysis = analyze_locally(text, Utc::now());
        assert_eq!(analysis.primary.category, EmotionCategory::Fear);
        let words = text.split(' ').count() as f32;
        assert!((analysis.intensity - 10.0 / words).abs() < 1e-6);
    }

    #[test]
    fn secondary_is_best_remaining_nonzero_category() {
        let analysis = analyze_locally(
            "I am angry and furious but also a little sad about this long long story here",
            Utc::now(),
        );
        assert_eq!(analysis.primary.category, EmotionCategory::Anger);
        let secondary = analysis.secondary.expect("secondary emotion");
        assert_eq!(secondary.category, EmotionCategory::Sadness);
    }

    #[test]
    fn ties_go_to_later_category() {
        let analysis = analyze_locally("glad yet scared", Utc::now());
        assert_eq!(analysis.primary.category, EmotionCategory::Fear);
        assert_eq!(analysis.secondary.map(|e| e.category), Some(EmotionCategory::Joy));
    }

    #[test]
    fn secondary_ties_also_go_to_later_category() {
        let analysis = analyze_locally("I am so angry, sad and scared, angry again", Utc::now());
        assert_eq!(analysis.primary.category, EmotionCategory::Anger);
        assert_eq!(analysis.secondary.map(|e| e.category), Some(EmotionCategory::Fear));
    }

    #[test]
    fn doubled_spaces_count_as_words() {
        let text = "a b c d e f g h i j  sad";
        let analysis = analyze_locally(text, Utc::now());
        assert_eq!(analysis.primary.category, EmotionCategory::Sadness);
        assert!((analysis.intensity - 10.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn no_keywords_reads_neutral_with_low_confidence() {
        let analysis = analyze_locally("The bus was on time.", Utc::now());
        assert_eq!(analysis.primary.category, EmotionCategory::Neutral);
        assert_eq!(analysis.intensity, 0.0);
        assert_eq!(analysis.confidence, 0.3);
    }

    #[test]
    fn empty_text_stays_in_range() {
        let analysis = analyze_locally("", Utc::now());
        assert!((0.0..=1.0).contains(&analysis.intensity));
        assert!((0.0..=1.0).contains(&analysis.confidence));
    }

    struct FailingAnalyst {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmotionAnalysisService for FailingAnalyst {
        async fn analyze_emotion(&self, _text: &str) -> PortResult<RemoteEmotion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PortError::Unexpected("OpenAI API error: 500".into()))
        }
    }

    struct FixedAnalyst;

    #[async_trait]
    impl EmotionAnalysisService for FixedAnalyst {
        async fn analyze_emotion(&self, _text: &str) -> PortResult<RemoteEmotion> {
            Ok(serde_json::from_str(
                r#"{
                    "primary": {"name": "hopeful", "category": "joy", "intensity": 0.7, "description": "looking forward"},
                    "intensity": 0.7,
                    "confidence": 0.9,
                    "context": "anticipation of a new job"
                }"#,
            )
            .unwrap())
        }
    }

    #[tokio::test]
    async fn remote_failure_falls_back_once_without_retry() {
        let remote = Arc::new(FailingAnalyst { calls: AtomicUsize::new(0) });
        let analyzer = EmotionAnalyzer::new(Some(remote.clone()));
        let analysis = analyzer.analyze("I am so happy").await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analysis.context, LOCAL_ANALYSIS_CONTEXT);
        assert_eq!(analysis.primary.category, EmotionCategory::Joy);
    }

    #[tokio::test]
    async fn remote_reading_is_used_verbatim() {
        let analyzer = EmotionAnalyzer::new(Some(Arc::new(FixedAnalyst)));
        let analysis = analyzer.analyze("new job soon").await;
        assert_eq!(analysis.primary.name, "hopeful");
        assert_eq!(analysis.confidence, 0.9);
        assert_eq!(analysis.context, "anticipation of a new job");
    }

    #[tokio::test]
    async fn local_analyzer_never_needs_a_remote() {
        let analyzer = EmotionAnalyzer::local();
        assert!(!analyzer.has_remote());
        let analysis = analyzer.analyze("so nervous and worried").await;
        assert_eq!(analysis.primary.category, EmotionCategory::Fear);
    }
}
