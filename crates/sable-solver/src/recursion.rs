//! Recursion guards for the conformance oracle and the annotation reader.
//!
//! `RecursionGuard` combines cycle detection (a visiting set), a depth
//! limit and an iteration budget. `DepthCounter` is the depth-only variant
//! for walks where revisiting the same node is legitimate.
//!
//! Limits come from named [`RecursionProfile`]s so call sites say what they
//! guard instead of repeating numbers.
//!
//! In debug builds, dropping a guard with active entries panics, which
//! catches a missing `leave()`.

use rustc_hash::FxHashSet;
use sable_common::limits;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Conditional conformance resolution.
    ///
    /// Each substituted `where` clause nests one level.
    ///
    /// depth = 64, iterations = 100,000
    ConformanceCheck,

    /// Nested type annotations (`[[Int]]`, `Box<Box<T>>`).
    ///
    /// depth = 128
    TypeAnnotation,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::ConformanceCheck => limits::MAX_CONFORMANCE_DEPTH,
            Self::TypeAnnotation => limits::MAX_TYPE_ANNOTATION_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::ConformanceCheck | Self::TypeAnnotation => 100_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// This key is already being visited.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks recursion state for cycle detection, depth limiting,
/// and iteration bounding.
///
/// ```ignore
/// let mut guard = RecursionGuard::with_profile(RecursionProfile::ConformanceCheck);
/// match guard.enter((ty, protocol)) {
///     RecursionResult::Entered => {
///         let result = check(ty);
///         guard.leave((ty, protocol));
///         result
///     }
///     RecursionResult::Cycle => true,
///     _ => false,
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a recursive computation for `key`.
    ///
    /// On `Entered` the caller must call [`leave`](Self::leave) with the
    /// same key.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }

        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not in the visiting set"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` between `enter(key)` and `leave(key)`.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce(&mut Self) -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f(self);
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Sticky: stays set until [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still in the visiting set",
                self.visiting.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Depth-only guard for stack overflow protection.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Returns `false` once the limit is reached; do not call `leave()` then.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave() called at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!("DepthCounter dropped with depth {}", self.depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_limits() {
        assert_eq!(RecursionProfile::ConformanceCheck.max_depth(), 64);
        assert_eq!(RecursionProfile::TypeAnnotation.max_depth(), 128);
        let custom = RecursionProfile::Custom {
            max_depth: 7,
            max_iterations: 42,
        };
        assert_eq!(custom.max_depth(), 7);
        assert_eq!(custom.max_iterations(), 42);
    }

    #[test]
    fn enter_leave_tracks_depth() {
        let mut guard = RecursionGuard::<u32>::with_profile(RecursionProfile::ConformanceCheck);
        assert_eq!(guard.enter(1), RecursionResult::Entered);
        assert_eq!(guard.enter(2), RecursionResult::Entered);
        assert_eq!(guard.depth(), 2);
        assert!(guard.is_visiting(&1));
        guard.leave(2);
        guard.leave(1);
        assert_eq!(guard.depth(), 0);
        assert_eq!(guard.iterations(), 2);
    }

    #[test]
    fn reentering_a_key_is_a_cycle() {
        let mut guard = RecursionGuard::<u32>::new(10, 100);
        assert!(guard.enter(5).is_entered());
        assert!(guard.enter(5).is_cycle());
        assert!(!guard.is_exceeded());
        guard.leave(5);
    }

    #[test]
    fn depth_limit_is_sticky() {
        let mut guard = RecursionGuard::<u32>::new(2, 100);
        assert!(guard.enter(1).is_entered());
        assert!(guard.enter(2).is_entered());
        assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
        guard.leave(2);
        guard.leave(1);
        assert!(guard.is_exceeded());
        guard.reset();
        assert!(!guard.is_exceeded());
    }

    #[test]
    fn iteration_budget() {
        let mut guard = RecursionGuard::<u32>::new(10, 2);
        assert!(guard.scope(1, |_| ()).is_ok());
        assert!(guard.scope(2, |_| ()).is_ok());
        assert_eq!(guard.scope(3, |_| ()), Err(RecursionResult::IterationExceeded));
    }

    #[test]
    fn scope_nests() {
        let mut guard = RecursionGuard::<u32>::new(10, 100);
        let depth = guard.scope(1, |g| g.scope(2, |g| g.depth()));
        assert_eq!(depth, Ok(Ok(2)));
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn depth_counter_limit() {
        let mut counter = DepthCounter::new(1);
        assert!(counter.enter());
        assert!(!counter.enter());
        assert!(counter.is_exceeded());
        counter.leave();
        assert_eq!(counter.depth(), 0);
    }
}
