//! Color source port for new tracker labels.

/// Supplies display colors for labels created by a sync run.
///
/// Colors carry no meaning; abstracting them keeps the reconciliation
/// engine free of randomness under test.
pub trait ColorSource: Send + Sync {
    /// Returns a color as six lowercase hex digits, without `#`.
    fn next_color(&self) -> String;
}
