use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadFailureKind {
    /// Wi-Fi was required but not available; nothing was sent.
    PolicyAbort,
    /// Transport or local I/O failure.
    Transport,
    /// The album service rejected a call.
    Service,
}

impl Display for UploadFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            UploadFailureKind::PolicyAbort => "policy_abort",
            UploadFailureKind::Transport => "transport",
            UploadFailureKind::Service => "service",
        };
        write!(f, "{}", kind)
    }
}
