//! Rate-shaping primitives.
//!
//! [`Debouncer`] and [`Throttler`] are generic value stabilizers with no
//! dependency on the rest of the crate. Both are pure deadline state
//! machines over [`std::time::Instant`]: callers `submit` inputs, read the
//! pending `deadline`, and `poll` once it passes. Owners arm real timers
//! from the reported deadlines (the mouse tracker uses
//! `tokio::time::sleep_until`); dropping the owner drops the pending state
//! with it, so nothing fires after teardown.

mod debounce;
mod throttle;

pub use debounce::Debouncer;
pub use throttle::Throttler;

/// Emptiness view used by the debounce guard.
pub trait HasLen {
    fn is_empty(&self) -> bool;
}

impl<T> HasLen for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T> HasLen for &[T] {
    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }
}

impl HasLen for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

impl HasLen for &str {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl<T> HasLen for Option<T> {
    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_len_impls() {
        assert!(Vec::<u8>::new().is_empty());
        assert!(!vec![1].is_empty());
        assert!(HasLen::is_empty(&""));
        assert!(!HasLen::is_empty(&"x"));
        assert!(HasLen::is_empty(&Option::<u8>::None));
        assert!(!HasLen::is_empty(&Some(1)));
    }
}
