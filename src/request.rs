//! Per-call conversion options.

/// Options that shape a single conversion call. Immutable for the duration
/// of the call; a default-constructed request gives standard behavior.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Emit prediction candidates that consume only a prefix of the
    /// segment key, tagged `PARTIALLY_KEY_CONSUMED`.
    pub create_partial_candidates: bool,
    /// Host hint: realtime conversion results come from this converter
    /// rather than a cheaper approximation. The core itself only records
    /// the flag.
    pub use_actual_converter_for_realtime_conversion: bool,
}

impl ConversionRequest {
    pub fn new() -> Self {
        Self::default()
    }
}
