//! Engine tuning knobs. Entity semantics live in the domain modules; this only
//! bounds the audit buffer and toggles event echoing for simulation runs.

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cap on retained audit events; older entries are dropped first.
    pub max_events: usize,
    /// Echo every emitted event to stdout.
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            verbose: false,
        }
    }
}
