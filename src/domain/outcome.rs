#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Skipped(SkipReason),
    Failed(Failure),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Reentry,
    Cancelled,
    Disabled,
    NotCandidate,
    AlreadyNative,
    AlreadyCorrected,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Reentry => "reentry",
            SkipReason::Cancelled => "cancelled",
            SkipReason::Disabled => "disabled",
            SkipReason::NotCandidate => "not_candidate",
            SkipReason::AlreadyNative => "already_native",
            SkipReason::AlreadyCorrected => "already_corrected",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    LayoutError,
    ImeError,
}
