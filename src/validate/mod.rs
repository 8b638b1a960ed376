//! Draft validation.
//!
//! - [`structural`]: blocking presence and parseability checks. A non-empty
//!   result refuses the save.
//! - [`semantic`]: advisory plausibility checks. Never blocks.
//!
//! Both return their findings as data; neither fails.

pub mod semantic;
pub mod structural;

pub use semantic::{validate_semantics, Role, SemanticWarning};
pub use structural::validate_structure;

/// Label an entry for messages: `President 2 (Ada)` or `President 2`.
pub(crate) fn describe(role: &str, position: usize, name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("{role} {position}")
    } else {
        format!("{role} {position} ({name})")
    }
}
