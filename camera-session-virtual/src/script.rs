//! Knobs that decide how the virtual platform answers.

/// How the platform answers the next open request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OpenBehavior {
    /// Deliver `opened` on the callback thread.
    #[default]
    Succeed,
    /// Deliver `error(code)` instead of `opened`.
    Error(i32),
    /// Deliver `disconnected` instead of `opened`.
    Disconnect,
    /// Refuse synchronously from `open_device`.
    Reject,
    /// Never answer.
    Hang,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Script {
    pub open: OpenBehavior,
    /// When set, every session configure fails with this reason.
    pub session_failure: Option<String>,
    pub fail_repeating: bool,
    pub next_session: u64,
}
