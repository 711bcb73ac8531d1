use crate::types::TaskStatus;

pub(crate) struct Symbols {
    pub pending: &'static str,
    pub completed: &'static str,
    pub skipped: &'static str,
    pub current: &'static str,
    pub bar_filled: &'static str,
    pub bar_empty: &'static str,
    pub ellipsis: &'static str,
    pub rule: &'static str,
    pub double_rule: &'static str,
    pub trophy: &'static str,
    pub alarm: &'static str,
    pub stop: &'static str,
    pub pause: &'static str,
}

impl Symbols {
    pub fn current() -> &'static Self {
        #[cfg(windows)]
        {
            let is_modern = std::env::var("WT_SESSION").is_ok()
                || std::env::var("TERM_PROGRAM").is_ok()
                || std::env::var("ALACRITTY_WINDOW_ID").is_ok();
            if !is_modern {
                return &ASCII_SYMBOLS;
            }
        }
        &UNICODE_SYMBOLS
    }

    pub fn status_icon(&self, status: TaskStatus) -> &'static str {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::Completed => self.completed,
            TaskStatus::Skipped => self.skipped,
        }
    }
}

const UNICODE_SYMBOLS: Symbols = Symbols {
    pending: "⬜",
    completed: "✅",
    skipped: "⏭️",
    current: "📌",
    bar_filled: "█",
    bar_empty: "░",
    ellipsis: "…",
    rule: "-",
    double_rule: "=",
    trophy: "🏆",
    alarm: "⏰",
    stop: "⏹️",
    pause: "⏸",
};

#[cfg(windows)]
const ASCII_SYMBOLS: Symbols = Symbols {
    pending: "[ ]",
    completed: "[x]",
    skipped: "[>]",
    current: "*",
    bar_filled: "#",
    bar_empty: ".",
    ellipsis: "...",
    rule: "-",
    double_rule: "=",
    trophy: "*",
    alarm: "!",
    stop: "[]",
    pause: "||",
};
