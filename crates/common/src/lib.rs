//! Shared types used across the walkspace crates.

mod types;

pub use types::{SceneId, TriggerId, horizontal};

pub fn crate_info() -> &'static str {
    "walkspace-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
