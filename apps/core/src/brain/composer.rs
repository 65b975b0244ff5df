//! Response composer: templated reply, coping tips, action plan and guide.
//!
//! Phrasing is randomised; the random source is passed in so callers (and
//! tests) control it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::annotators::{Intent, StressType};

/// Template key used when a label has no templates of its own.
pub const FALLBACK_LABEL: &str = "General Stress";

const TEMPLATES: &[(&str, [&str; 5])] = &[
    (
        "High Stress",
        [
            "That sounds really intense 😞. You’ve been carrying a lot — maybe try a slow breathing exercise?",
            "It’s okay to pause and breathe. You’re not alone in this 💙.",
            "Sounds like too much pressure right now. Want to try a short mental reset?",
            "That must be overwhelming. Take 3 slow breaths and give your body a moment to calm down.",
            "I know it feels like too much. What’s the biggest thing stressing you right now?",
        ],
    ),
    (
        "Medium Stress",
        [
            "You’re under pressure, but still grounded. Let’s slow things down a bit.",
            "Seems like you’re holding up fine — want to try a relaxation tip?",
            "You’ve got a lot going on. Try one small self-care action right now.",
            "Your stress sounds manageable — still, a short walk could help clear your head.",
            "You’re doing better than you think. Keep breathing through it.",
        ],
    ),
    (
        "Low Stress",
        [
            "Good to hear you’re calm 🌿. Let’s keep that balance going.",
            "That’s great — stay in this peaceful headspace as long as you can.",
            "You sound centered and relaxed. Maybe enjoy a quick mindful moment.",
            "You’re in control — that’s great energy to maintain.",
            "Keep protecting this calm — it’s precious.",
        ],
    ),
    (
        "Work/Academic",
        [
            "Deadlines can be rough. Try focusing on one task for 25 minutes — Pomodoro style.",
            "Work pressure builds up — short breaks actually boost focus.",
            "You sound mentally drained. Let’s reset — step away for 5 minutes.",
            "Overthinking assignments burns energy. Focus on what’s achievable today.",
            "You’re capable of handling this, just one thing at a time.",
        ],
    ),
    (
        "Relationship",
        [
            "That’s emotionally heavy 💔. It’s okay to take time for yourself.",
            "Relationships get messy — but your mental peace comes first.",
            "Feeling disconnected hurts. Try writing what you wish you could say — it helps release pain.",
            "You deserve understanding and comfort, not confusion.",
            "Even loneliness passes — you’re stronger than you think.",
        ],
    ),
    (
        "Calm/Positive",
        [
            "That’s wonderful 😌. Keep that relaxed energy flowing.",
            "You seem in a good place. Maybe play some calm music to stay grounded.",
            "Peace looks good on you — keep nurturing it.",
            "Grateful moments like these are worth holding onto.",
            "Nice! Keep enjoying this positive state today.",
        ],
    ),
    (
        FALLBACK_LABEL,
        [
            "It’s okay to feel stressed. Let’s take a deep breath first.",
            "We all have heavy days. What’s one thing you can let go of right now?",
            "Let’s focus on small relief — breathing, stretching, music, or journaling?",
            "Stress happens, but you don’t have to face it alone.",
            "Want me to guide a quick relaxation technique?",
        ],
    ),
];

pub const SUFFIXES: [&str; 3] = [
    "",
    " Remember, small breaks help big stress.",
    " You’re doing your best — that’s enough.",
];

const BREATHING_INSTRUCTION: &str =
    "Try 4-4-4 breathing: inhale 4s, hold 4s, exhale 4s for 4 cycles.";

/// Structured exercise attached to anxious or panicked messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    #[serde(rename = "type")]
    pub kind: String,
    pub instruction: String,
}

impl Guide {
    pub fn breathing() -> Self {
        Self {
            kind: "breathing".to_string(),
            instruction: BREATHING_INSTRUCTION.to_string(),
        }
    }
}

/// Everything the composer adds on top of the classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub message: String,
    pub tips: Vec<String>,
    pub action_plan: Vec<String>,
    pub guide: Option<Guide>,
}

/// Candidate replies for `label`, falling back to the general set.
pub fn templates_for(label: &str) -> &'static [&'static str] {
    TEMPLATES
        .iter()
        .find(|(key, _)| *key == label)
        .or_else(|| TEMPLATES.iter().find(|(key, _)| *key == FALLBACK_LABEL))
        .map(|(_, templates)| templates.as_slice())
        .unwrap_or(&[])
}

pub fn coping_tips(stress_type: StressType) -> &'static [&'static str] {
    match stress_type {
        StressType::Anxiety => &[
            "Try a 4-4-4 breathing: inhale 4s, hold 4s, exhale 4s.",
            "Grounding: name 5 things you see, 4 things you can touch.",
            "If worry is future-focused, schedule a 10-minute \"worry time\" later.",
        ],
        StressType::Depression => &[
            "Try behavioral activation: one small achievable task (e.g., 5-minute walk).",
            "Connect with a supportive person or write one sentence about how you feel.",
        ],
        StressType::WorkAcademic => &[
            "Break tasks into 25-minute focus blocks (Pomodoro).",
            "Prioritize 1–2 tasks for today and let others wait.",
        ],
        StressType::Burnout => &[
            "Schedule a real rest: an afternoon without work tasks.",
            "Say no to one request this week to protect energy.",
        ],
        StressType::Relationship => &[
            "Try writing what you need to say before a conversation.",
            "Set a small, specific boundary and observe what changes.",
        ],
        StressType::General => &[
            "Take three slow diaphragmatic breaths.",
            "Step outside for 5 minutes and notice your surroundings.",
        ],
    }
}

/// Three-step plan: breathing first, then workload, else a generic reset.
pub fn action_plan(stress_type: StressType, intent: Intent) -> &'static [&'static str] {
    if stress_type == StressType::Anxiety || intent == Intent::Panic {
        &[
            "Pause and do a 3-minute breathing exercise (4-4-4).",
            "Ground: name 5 things you see, 4 you can touch, 3 you hear.",
            "If it continues, consider contacting a trusted person or professional.",
        ]
    } else if stress_type == StressType::WorkAcademic || intent == Intent::Workload {
        &[
            "Identify the single most important task and work on it for 25 minutes.",
            "Take a 10-minute break and move your body.",
            "Re-evaluate deadlines and ask for help if needed.",
        ]
    } else {
        &[
            "Take 3 slow diaphragmatic breaths to reset.",
            "Write down the top worry in one sentence.",
            "Choose one small action you can do in the next 30 minutes.",
        ]
    }
}

pub fn guide_for(stress_type: StressType, intent: Intent) -> Option<Guide> {
    (stress_type == StressType::Anxiety || intent == Intent::Panic).then(Guide::breathing)
}

/// Picks a reply for `label` plus a random suffix.
pub fn reply<R: Rng + ?Sized>(label: &str, rng: &mut R) -> String {
    let base = templates_for(label).choose(rng).copied().unwrap_or_default();
    let suffix = SUFFIXES.choose(rng).copied().unwrap_or_default();
    format!("{}{}", base, suffix)
}

pub fn compose<R: Rng + ?Sized>(
    label: &str,
    stress_type: StressType,
    intent: Intent,
    rng: &mut R,
) -> Composition {
    Composition {
        message: reply(label, rng),
        tips: to_owned(coping_tips(stress_type)),
        action_plan: to_owned(action_plan(stress_type, intent)),
        guide: guide_for(stress_type, intent),
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
