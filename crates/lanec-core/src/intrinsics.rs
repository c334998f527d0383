//! Naming contract shared with the runtime library.
//!
//! Target-specific runtime code may call `bool __is_compile_time_constant_*(...)`
//! to pick a cheaper code path when a value (for example, the execution mask)
//! is known at compile time. The front end inlines those functions verbatim;
//! the optimizer resolves every surviving call to a literal boolean before
//! code generation, which has no lowering for them.

/// Name prefix of the constancy probe family. Probes are identified purely by
/// this prefix, not by signature.
pub const COMPILE_TIME_CONSTANT_PREFIX: &str = "__is_compile_time_constant_";

/// Whether `name` belongs to the constancy probe family.
pub fn is_compile_time_constant_probe(name: &str) -> bool {
    name.starts_with(COMPILE_TIME_CONSTANT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_probe_names() {
        assert!(is_compile_time_constant_probe(
            "__is_compile_time_constant_mask"
        ));
        assert!(is_compile_time_constant_probe(
            "__is_compile_time_constant_uniform_int32"
        ));
    }

    #[test]
    fn rejects_other_runtime_names() {
        assert!(!is_compile_time_constant_probe("__movmsk"));
        assert!(!is_compile_time_constant_probe("is_compile_time_constant"));
        // Prefix must be complete, including the trailing underscore.
        assert!(!is_compile_time_constant_probe("__is_compile_time_constant"));
    }
}
