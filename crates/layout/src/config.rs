/// Opt-in invariant checks for debugging the layout core.
///
/// Both checks are O(subtree size) per mutation and are meant to be off in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugOptions {
    /// Re-validates block/inline nesting on `add_child` and recomputes descendant counts
    /// after every structural edit.
    pub paranoid_checks: bool,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            paranoid_checks: cfg!(feature = "paranoid"),
        }
    }
}

impl DebugOptions {
    pub fn paranoid() -> Self {
        Self {
            paranoid_checks: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            paranoid_checks: false,
        }
    }
}

/// Tuning knobs of the page-break position index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakListTuning {
    /// Number of entries searched on either side of the estimated index before falling back
    /// to a full binary search.
    ///
    /// Defaults to `7`.
    pub search_slack: usize,
    /// Upper bound for a single growth step of the break arrays. Each resize grows the
    /// storage by 50%, but never by more than this many entries.
    ///
    /// Defaults to `512`.
    pub max_growth_step: usize,
    /// Initial capacity of the break arrays.
    ///
    /// Defaults to `32`.
    pub initial_capacity: usize,
}

impl Default for BreakListTuning {
    fn default() -> Self {
        Self {
            search_slack: 7,
            max_growth_step: 512,
            initial_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutConfig {
    pub debug: DebugOptions,
    pub break_list: BreakListTuning,
}

impl LayoutConfig {
    pub fn with_debug(mut self, debug: DebugOptions) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_break_list(mut self, tuning: BreakListTuning) -> Self {
        self.break_list = tuning;
        self
    }

    /// A configuration with every paranoid check switched on.
    pub fn paranoid() -> Self {
        Self::default().with_debug(DebugOptions::paranoid())
    }
}
