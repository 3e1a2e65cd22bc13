//! Dispatch walk state machine
//!
//! Provider iteration is modeled as an explicit state machine with a pure
//! transition function, so ordering and termination rules can be tested
//! without async machinery or mock transports. Indices refer to positions in
//! the resolved candidate list.

/// State of one dispatch walk over the resolved candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// The provider at `index` is being attempted.
    Attempting { index: usize },
    /// The provider at `index` produced the winning result. Terminal.
    Success { index: usize },
    /// The provider at `failed_index` failed and a later candidate exists;
    /// the walk continues via [`DispatchState::resume`].
    Fallback { failed_index: usize },
    /// Every permitted candidate failed. Terminal.
    Exhausted,
}

impl DispatchState {
    /// Initial state: attempting the first candidate.
    #[must_use]
    pub const fn start() -> Self {
        Self::Attempting { index: 0 }
    }

    /// Transition after the current provider's attempt finished.
    ///
    /// Success wins immediately. A failure moves to [`Self::Fallback`] only
    /// when fallback is allowed and a later candidate exists; otherwise the
    /// walk is exhausted. Terminal states absorb further transitions.
    #[must_use]
    pub const fn advance(self, succeeded: bool, candidates: usize, allow_fallback: bool) -> Self {
        match self {
            Self::Attempting { index } => {
                if succeeded {
                    Self::Success { index }
                } else if allow_fallback && index + 1 < candidates {
                    Self::Fallback { failed_index: index }
                } else {
                    Self::Exhausted
                }
            }
            terminal => terminal,
        }
    }

    /// Move from [`Self::Fallback`] to attempting the next candidate.
    ///
    /// Any other state is returned unchanged.
    #[must_use]
    pub const fn resume(self) -> Self {
        match self {
            Self::Fallback { failed_index } => Self::Attempting { index: failed_index + 1 },
            other => other,
        }
    }

    /// Whether the walk has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Exhausted)
    }
}
