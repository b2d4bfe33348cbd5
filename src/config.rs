// ABOUTME: Version, banner, and environment bootstrap constants.
// No sandboxing surface exists at this layer (spec §1), so this stays a
// handful of named constants rather than a config struct.

pub const VERSION: &str = "1.0.0";

pub const REPL_BANNER: &str = "Zox REPL\n";
pub const REPL_PROMPT: &str = ">>> ";
pub const HISTORY_FILE: &str = ".zox_history";

pub const PI: f64 = std::f64::consts::PI;
pub const GLOBAL_SCOPE_NAME: &str = "global";
