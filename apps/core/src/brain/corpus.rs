//! Hand-written training corpus for the stress classifier.

/// A labelled training sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingExample {
    pub text: &'static str,
    pub label: &'static str,
}

const fn ex(text: &'static str, label: &'static str) -> TrainingExample {
    TrainingExample { text, label }
}

pub const HIGH_STRESS: &str = "High Stress";
pub const MEDIUM_STRESS: &str = "Medium Stress";
pub const LOW_STRESS: &str = "Low Stress";
pub const WORK_ACADEMIC: &str = "Work/Academic";
pub const RELATIONSHIP: &str = "Relationship";
pub const CALM_POSITIVE: &str = "Calm/Positive";

/// The six classifier labels.
pub const LABELS: [&str; 6] = [
    HIGH_STRESS,
    MEDIUM_STRESS,
    LOW_STRESS,
    WORK_ACADEMIC,
    RELATIONSHIP,
    CALM_POSITIVE,
];

pub const TRAINING_EXAMPLES: &[TrainingExample] = &[
    ex("I feel anxious and can’t stop overthinking", HIGH_STRESS),
    ex("My workload is overwhelming", HIGH_STRESS),
    ex("I can’t sleep, everything feels heavy", HIGH_STRESS),
    ex("I’m exhausted and losing focus", HIGH_STRESS),
    ex("I’m mentally drained and want to cry", HIGH_STRESS),
    ex("Exams make me panic every night", HIGH_STRESS),
    ex("Too much pressure, I can’t handle it anymore", HIGH_STRESS),
    ex("Everything feels out of control and chaotic", HIGH_STRESS),
    ex("I’m stressed but I can handle it", MEDIUM_STRESS),
    ex("I feel a bit tense but trying to relax", MEDIUM_STRESS),
    ex("Work is hectic but manageable", MEDIUM_STRESS),
    ex("I’m tired from studying all week", MEDIUM_STRESS),
    ex("I feel pressure but not too much", MEDIUM_STRESS),
    ex("I’m low on energy today", MEDIUM_STRESS),
    ex("I feel down, but I’ll bounce back soon", MEDIUM_STRESS),
    ex("I’m calm and peaceful today", LOW_STRESS),
    ex("Everything feels balanced and okay", LOW_STRESS),
    ex("I’m grateful for the quiet moments", LOW_STRESS),
    ex("I feel light and relaxed", LOW_STRESS),
    ex("I’m content with how things are", LOW_STRESS),
    ex("I’m focused and motivated today", LOW_STRESS),
    ex("I feel mentally clear", LOW_STRESS),
    ex("Deadlines are stressing me out", WORK_ACADEMIC),
    ex("Too many assignments due this week", WORK_ACADEMIC),
    ex("My exams are making me panic", WORK_ACADEMIC),
    ex("Workload keeps increasing every day", WORK_ACADEMIC),
    ex("I’m burned out from continuous studying", WORK_ACADEMIC),
    ex("College projects are draining my mind", WORK_ACADEMIC),
    ex("My partner and I had a fight", RELATIONSHIP),
    ex("I feel lonely and ignored", RELATIONSHIP),
    ex("Breakups are emotionally exhausting", RELATIONSHIP),
    ex("I miss my friend, it’s depressing", RELATIONSHIP),
    ex("No one understands me lately", RELATIONSHIP),
    ex("My relationship is falling apart", RELATIONSHIP),
    ex("I feel happy and positive today", CALM_POSITIVE),
    ex("Everything is going well in life", CALM_POSITIVE),
    ex("I’m relaxed and mentally stable", CALM_POSITIVE),
    ex("Feeling peaceful and grateful", CALM_POSITIVE),
    ex("I’m excited about the future", CALM_POSITIVE),
    ex("I feel good and confident about myself", CALM_POSITIVE),
];
