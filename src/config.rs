//! Interpreter settings.
//!
//! Values are layered, highest priority first: command-line flags, `BF_*`
//! environment variables, the `[interpreter]` section of `bf.toml`, then
//! built-in defaults.

use std::fs;
use std::path::PathBuf;

use clap::ValueEnum;
use cross_xdg::BaseDirs;

use crate::dump::DumpFormat;
use crate::tape::DEFAULT_TAPE_SIZE;

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Tape length in cells.
    pub memory_size: usize,
    pub dump: DumpFormat,
    pub verbosity: u8,
    /// `None` lets loops nest without limit.
    pub max_loop_depth: Option<usize>,
    pub max_steps: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_TAPE_SIZE,
            dump: DumpFormat::None,
            verbosity: 0,
            max_loop_depth: None,
            max_steps: None,
        }
    }
}

/// One configuration layer. Unset fields defer to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub memory_size: Option<usize>,
    pub dump: Option<DumpFormat>,
    pub verbosity: Option<u8>,
    pub max_loop_depth: Option<usize>,
    pub max_steps: Option<usize>,
}

const ENV_KEYS: [(&str, &str); 4] = [
    ("BF_MEMORY", "memory_size"),
    ("BF_DUMP", "dump"),
    ("BF_MAX_STEPS", "max_steps"),
    ("BF_MAX_DEPTH", "max_loop_depth"),
];

impl Overrides {
    /// Fill fields unset here from `lower`.
    pub fn or(self, lower: Overrides) -> Overrides {
        Overrides {
            memory_size: self.memory_size.or(lower.memory_size),
            dump: self.dump.or(lower.dump),
            verbosity: self.verbosity.or(lower.verbosity),
            max_loop_depth: self.max_loop_depth.or(lower.max_loop_depth),
            max_steps: self.max_steps.or(lower.max_steps),
        }
    }

    pub fn apply(self, base: Settings) -> Settings {
        Settings {
            memory_size: self.memory_size.unwrap_or(base.memory_size),
            dump: self.dump.unwrap_or(base.dump),
            verbosity: self.verbosity.unwrap_or(base.verbosity),
            max_loop_depth: self.max_loop_depth.or(base.max_loop_depth),
            max_steps: self.max_steps.or(base.max_steps),
        }
    }

    /// Set `key` from its textual `value`. Returns a warning when the key is
    /// unknown or the value does not parse.
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let bad_value = |what: &str| format!("ignoring {key} = {value:?}: expected {what}");
        match key {
            "memory_size" | "memory" => {
                self.memory_size = Some(value.parse().map_err(|_| bad_value("a cell count"))?);
            }
            "dump" => {
                self.dump = Some(
                    DumpFormat::from_str(value, true).map_err(|_| bad_value("none, hex or ascii"))?,
                );
            }
            "verbose" | "verbosity" => {
                self.verbosity = Some(match value {
                    "true" => 1,
                    "false" => 0,
                    n => n.parse().map_err(|_| bad_value("true, false or a level"))?,
                });
            }
            "max_loop_depth" | "max_depth" => {
                self.max_loop_depth = Some(value.parse().map_err(|_| bad_value("a nesting depth"))?);
            }
            "max_steps" => {
                self.max_steps = Some(value.parse().map_err(|_| bad_value("a step count"))?);
            }
            _ => return Err(format!("ignoring unknown setting {key:?}")),
        }
        Ok(())
    }

    /// Read the `BF_*` variables through `lookup`.
    pub fn from_env_with<F>(lookup: F, warnings: &mut Vec<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layer = Overrides::default();
        for (var, key) in ENV_KEYS {
            if let Some(value) = lookup(var) {
                if let Err(w) = layer.set(key, value.trim()) {
                    warnings.push(format!("{var}: {w}"));
                }
            }
        }
        layer
    }

    pub fn from_env(warnings: &mut Vec<String>) -> Self {
        Self::from_env_with(|var| std::env::var(var).ok(), warnings)
    }

    /// Parse the `[interpreter]` section of a `bf.toml` document.
    pub fn from_toml(content: &str, warnings: &mut Vec<String>) -> Self {
        // Very small hand-rolled parser: only `key = value` lines under [interpreter].
        let mut layer = Overrides::default();
        let mut in_section = false;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                in_section = &line[1..line.len() - 1] == "interpreter";
                continue;
            }
            if !in_section {
                continue;
            }
            let Some((key, raw)) = line.split_once('=') else {
                warnings.push(format!("ignoring malformed line {line:?}"));
                continue;
            };
            let value = raw.trim().trim_matches('"').trim_matches('\'');
            if let Err(w) = layer.set(key.trim(), value) {
                warnings.push(w);
            }
        }
        layer
    }
}

/// `BF_CONFIG` if set, otherwise `bf.toml` in the XDG config home.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("BF_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

/// Layer `cli` over the environment and config file. Problems with the
/// lower layers come back as warnings rather than errors.
pub fn resolve(cli: Overrides) -> (Settings, Vec<String>) {
    let mut warnings = Vec::new();
    let env = Overrides::from_env(&mut warnings);
    let file = config_path()
        .and_then(|path| fs::read_to_string(path).ok())
        .map(|content| Overrides::from_toml(&content, &mut warnings))
        .unwrap_or_default();

    let settings = cli.or(env).or(file).apply(Settings::default());
    (settings, warnings)
}
