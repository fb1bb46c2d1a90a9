//! Evaluation Context

/// Relative tolerance used when no other is requested
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Evaluation context passed to plugins
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    /// Relative tolerance for numeric comparisons (equivalence checks)
    pub tolerance: f64,
}

impl EvalContext {
    pub fn new() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_override() {
        assert_eq!(EvalContext::new().tolerance, DEFAULT_TOLERANCE);
        assert_eq!(EvalContext::default().with_tolerance(0.5).tolerance, 0.5);
    }
}
