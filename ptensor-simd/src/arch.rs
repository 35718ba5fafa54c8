//! Architecture-specific kernel implementations.
//!
//! Functions in these modules are `unsafe` and assume both that the required
//! CPU features are present and that pointer arguments are valid. The safe
//! wrappers in the parent crate check both.

#[cfg(target_arch = "x86_64")]
pub mod x86_64;
