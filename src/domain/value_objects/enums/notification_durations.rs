use std::fmt::Display;

/// How long a user notification should stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationDuration {
    Short,
    Long,
}

impl Display for NotificationDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = match self {
            NotificationDuration::Short => "short",
            NotificationDuration::Long => "long",
        };
        write!(f, "{}", duration)
    }
}
