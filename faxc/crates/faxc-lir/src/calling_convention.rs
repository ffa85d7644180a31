//! The fixed, non-standard parameter-passing ABI and platform-dependent
//! entry-symbol mangling.
//!
//! Grounded on `original_source/src/assembler/assembler.py`'s
//! `argRegisters` list and its `os.platform() == "darwin"` branch for
//! the entry symbol. This is *not* the real System V AMD64 ABI order
//! (which starts `rdi, rsi, rdx, rcx, r8, r9`); per SPEC_FULL.md §4.6
//! the reference's own fixed `{r8d..r15d}` order is kept as-is, so this
//! module does not reuse `faxc-lir`'s register list for anything beyond
//! literally this constant.

use crate::operand::Register;

/// Target platform, as far as entry-symbol naming is concerned. Both
/// platforms agree on every other aspect of codegen (AT&T syntax,
/// underscore-prefixed non-entry functions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
}

impl Platform {
    pub fn host() -> Platform {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// Integer parameters are passed in this fixed register order,
/// regardless of how many a function declares (callers with more than
/// 8 arguments are rejected by [`crate::error::LirError::TooManyArguments`]).
pub const PARAM_REGISTERS: [Register; 8] = [
    Register::R8d,
    Register::R9d,
    Register::R10d,
    Register::R11d,
    Register::R12d,
    Register::R13d,
    Register::R14d,
    Register::R15d,
];

/// The entry function (`main`) is bare on Linux and `_main` on macOS;
/// every other function is underscore-prefixed on both platforms.
pub fn mangled_name(name: &str, platform: Platform) -> String {
    if name == "main" {
        match platform {
            Platform::Linux => "main".to_string(),
            Platform::MacOs => "_main".to_string(),
        }
    } else {
        format!("_{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_is_bare_on_linux_and_underscored_on_macos() {
        assert_eq!(mangled_name("main", Platform::Linux), "main");
        assert_eq!(mangled_name("main", Platform::MacOs), "_main");
    }

    #[test]
    fn every_other_function_is_underscored_on_both_platforms() {
        assert_eq!(mangled_name("sum", Platform::Linux), "_sum");
        assert_eq!(mangled_name("sum", Platform::MacOs), "_sum");
    }
}
