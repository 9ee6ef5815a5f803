//! Per-record fallback switch
//!
//! A record starts in [`FallbackState::Default`] and defers to the field and
//! provider policy. `enable`/`disable` pin the state until changed again.
//! The scoped variants return a [`FallbackScope`] guard that puts the previous
//! state back when dropped, which also happens while unwinding from a panic.
//! Guards deref to their owner, so scopes nest:
//!
//! ```
//! use json_translate::fallback::{FallbackState, FallbackToggle};
//!
//! let mut toggle = FallbackToggle::new();
//! toggle.enable();
//! {
//!     let mut outer = toggle.disable_scoped();
//!     assert_eq!(outer.state(), FallbackState::Disabled);
//!     {
//!         let inner = outer.enable_scoped();
//!         assert_eq!(inner.state(), FallbackState::Enabled);
//!     }
//!     assert_eq!(outer.state(), FallbackState::Disabled);
//! }
//! assert_eq!(toggle.state(), FallbackState::Enabled);
//! ```
//!
//! Scopes follow the borrow stack of a single thread; the toggle has no
//! locking and sharing one record across threads is not supported.

use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackState {
    /// Defer to the field option, then the provider default.
    #[default]
    Default,
    Enabled,
    Disabled,
}

impl FallbackState {
    pub fn explicit(self) -> Option<bool> {
        match self {
            FallbackState::Default => None,
            FallbackState::Enabled => Some(true),
            FallbackState::Disabled => Some(false),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackToggle {
    state: FallbackState,
}

impl FallbackToggle {
    pub fn new() -> Self {
        FallbackToggle::default()
    }

    pub fn state(&self) -> FallbackState {
        self.state
    }

    pub fn enable(&mut self) {
        self.state = FallbackState::Enabled;
    }

    pub fn disable(&mut self) {
        self.state = FallbackState::Disabled;
    }

    /// Forget any explicit choice.
    pub fn reset(&mut self) {
        self.state = FallbackState::Default;
    }

    /// Effective flag given the policy that applies when no explicit state
    /// is set.
    pub fn is_enabled(&self, policy: bool) -> bool {
        self.state.explicit().unwrap_or(policy)
    }
}

/// Anything that owns a [`FallbackToggle`] and can hand out scopes over it.
pub trait HasFallbackToggle {
    fn fallback_toggle(&self) -> &FallbackToggle;
    fn fallback_toggle_mut(&mut self) -> &mut FallbackToggle;

    fn enable_scoped(&mut self) -> FallbackScope<'_, Self>
    where
        Self: Sized,
    {
        FallbackScope::new(self, FallbackState::Enabled)
    }

    fn disable_scoped(&mut self) -> FallbackScope<'_, Self>
    where
        Self: Sized,
    {
        FallbackScope::new(self, FallbackState::Disabled)
    }

    /// Run `f` with fallback enabled, restoring the previous state afterwards.
    fn with_fallback<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut scope = self.enable_scoped();
        f(&mut *scope)
    }

    /// Run `f` with fallback disabled, restoring the previous state afterwards.
    fn without_fallback<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut scope = self.disable_scoped();
        f(&mut *scope)
    }
}

impl HasFallbackToggle for FallbackToggle {
    fn fallback_toggle(&self) -> &FallbackToggle {
        self
    }

    fn fallback_toggle_mut(&mut self) -> &mut FallbackToggle {
        self
    }
}

/// Guard holding a temporary fallback state. Restores on drop.
#[must_use = "the previous fallback state is restored as soon as the scope is dropped"]
pub struct FallbackScope<'a, T: HasFallbackToggle> {
    owner: &'a mut T,
    previous: FallbackState,
}

impl<'a, T: HasFallbackToggle> FallbackScope<'a, T> {
    fn new(owner: &'a mut T, state: FallbackState) -> Self {
        let toggle = owner.fallback_toggle_mut();
        let previous = toggle.state;
        toggle.state = state;
        FallbackScope { owner, previous }
    }

    /// State that will be restored when the scope ends.
    pub fn previous(&self) -> FallbackState {
        self.previous
    }
}

impl<T: HasFallbackToggle> Deref for FallbackScope<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.owner
    }
}

impl<T: HasFallbackToggle> DerefMut for FallbackScope<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.owner
    }
}

impl<T: HasFallbackToggle> Drop for FallbackScope<'_, T> {
    fn drop(&mut self) {
        self.owner.fallback_toggle_mut().state = self.previous;
    }
}
