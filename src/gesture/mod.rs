//! Fixed shortcut bindings for the mode-cycle commands
//!
//! Gesture capture and registration belong to the host; this module
//! only owns the binding table that maps a forwarded gesture
//! identifier to the feature whose mode it cycles.

use std::collections::HashMap;

use crate::echo::Feature;

/// The gesture identifier bound to cycling typed-character echo
pub const CYCLE_CHARACTERS_GESTURE: &str = "kb:reader+2";
/// The gesture identifier bound to cycling typed-word echo
pub const CYCLE_WORDS_GESTURE: &str = "kb:reader+3";

/// Table of gesture identifiers and the features they cycle
#[derive(Debug, Clone)]
pub struct GestureBindings {
    map: HashMap<&'static str, Feature>,
}

impl GestureBindings {
    /// The fixed standard bindings
    pub fn standard() -> Self {
        let mut map = HashMap::new();
        map.insert(CYCLE_CHARACTERS_GESTURE, Feature::Characters);
        map.insert(CYCLE_WORDS_GESTURE, Feature::Words);
        Self { map }
    }

    /// Resolve a host-forwarded gesture identifier to its feature
    ///
    /// Identifiers compare case-insensitively after trimming; an
    /// unbound identifier resolves to `None` and must not change any
    /// state.
    pub fn resolve(&self, identifier: &str) -> Option<Feature> {
        let normalized = identifier.trim().to_ascii_lowercase();
        self.map.get(normalized.as_str()).copied()
    }

    /// The identifiers the host should register, for status displays
    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.map.keys().copied()
    }
}

impl Default for GestureBindings {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_bindings() {
        let bindings = GestureBindings::standard();
        assert_eq!(bindings.resolve("kb:reader+2"), Some(Feature::Characters));
        assert_eq!(bindings.resolve("kb:reader+3"), Some(Feature::Words));
    }

    #[test]
    fn test_resolution_is_case_insensitive() {
        let bindings = GestureBindings::standard();
        assert_eq!(bindings.resolve("KB:Reader+2"), Some(Feature::Characters));
        assert_eq!(bindings.resolve("  kb:reader+3 "), Some(Feature::Words));
    }

    #[test]
    fn test_unbound_gesture_resolves_to_none() {
        let bindings = GestureBindings::standard();
        assert_eq!(bindings.resolve("kb:reader+4"), None);
        assert_eq!(bindings.resolve(""), None);
    }
}
