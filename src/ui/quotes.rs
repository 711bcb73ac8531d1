use rand::seq::IndexedRandom;

use crate::types::TaskStatus;

const COMPLETED_MESSAGES: &[&str] = &[
    "Great job! You did it! 🎉",
    "Amazing work! Keep going! 💪",
    "You're on fire! 🔥",
    "One step closer to done! ⭐",
];

const SKIPPED_MESSAGES: &[&str] = &[
    "No worries, you can come back to it. 👌",
    "Sometimes we need to skip ahead. That's okay! 🙂",
];

const COMPLIMENTS: &[&str] = &[
    "Task done! That's a huge win.",
    "Finished it! Keep that momentum.",
    "Completed! Time for the next level.",
    "Success! You closed that loop.",
    "Nailed it! Nothing stops you now.",
    "Checked off! Move on and build.",
    "Done. Small victory, big impact.",
    "Zero hesitation. Pure execution.",
    "Forward progress confirmed. Great job!",
    "One more down. You're unstoppable.",
    "Your practice is clearly working.",
    "That effort is going to pay off huge.",
    "Well done! You committed and finished.",
    "Excellent focus! Keep that intensity.",
    "That's solid, consistent work.",
    "You're building great habits.",
    "No shortcuts needed. True dedication.",
    "That's the sound of progress!",
    "Your commitment is showing results.",
    "Hard work done right. Fantastic.",
];

/// Supportive line shown after a task leaves `Pending`.
pub(crate) fn encouragement(status: TaskStatus) -> &'static str {
    let pool = match status {
        TaskStatus::Skipped => SKIPPED_MESSAGES,
        TaskStatus::Completed | TaskStatus::Pending => COMPLETED_MESSAGES,
    };
    pick(pool)
}

pub(crate) fn compliment() -> &'static str {
    pick(COMPLIMENTS)
}

fn pick(pool: &'static [&'static str]) -> &'static str {
    pool.choose(&mut rand::rng()).copied().unwrap_or_default()
}
