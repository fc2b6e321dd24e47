use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Flag defaults that can be persisted in an rc file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub read_only: bool,
    pub require_session: bool,
    pub theme: Option<ThemeMode>,
    pub placeholder: Option<String>,
    pub session_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: booleans accumulate, valued options from
    /// `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            read_only: self.read_only || other.read_only,
            require_session: self.require_session || other.require_session,
            theme: other.theme.or(self.theme),
            placeholder: other
                .placeholder
                .clone()
                .or_else(|| self.placeholder.clone()),
            session_file: other
                .session_file
                .clone()
                .or_else(|| self.session_file.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

/// Per-user configuration directory for inkdesk.
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("inkdesk");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("inkdesk");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("inkdesk");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("inkdesk");
        }
    }

    PathBuf::from(".inkdesk")
}

pub fn global_config_path() -> PathBuf {
    config_dir().join("config")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".inkdeskrc")
}

pub fn default_session_path() -> PathBuf {
    config_dir().join("session.json")
}

/// Load flags from an rc file. A missing file yields the defaults.
///
/// One flag per line; a valued flag takes the rest of its line, so
/// placeholders may contain spaces.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| match line.split_once(char::is_whitespace) {
            Some((flag, value)) => vec![flag.to_owned(), value.trim().to_owned()],
            None => vec![line.to_owned()],
        })
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# inkdesk defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.read_only {
        lines.push("--read-only".to_string());
    }
    if flags.require_session {
        lines.push("--require-session".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(placeholder) = &flags.placeholder {
        lines.push(format!("--placeholder {placeholder}"));
    }
    if let Some(path) = &flags.session_file {
        lines.push(format!("--session-file {}", path.display()));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract persistable flags from argument tokens, ignoring anything else.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "-w" | "--watch" => flags.watch = true,
            "--read-only" => flags.read_only = true,
            "--require-session" => flags.require_session = true,
            "--theme" | "--placeholder" | "--session-file" | "--log-file" => {
                if let Some(next) = tokens.get(i + 1) {
                    apply_valued(&mut flags, token, next);
                    i += 1;
                }
            }
            _ => {
                if let Some((flag, value)) = token.split_once('=') {
                    apply_valued(&mut flags, flag, value);
                }
            }
        }
        i += 1;
    }
    flags
}

fn apply_valued(flags: &mut ConfigFlags, flag: &str, value: &str) {
    match flag {
        "--theme" => flags.theme = parse_theme(value),
        "--placeholder" => flags.placeholder = Some(value.to_string()),
        "--session-file" => flags.session_file = Some(PathBuf::from(value)),
        "--log-file" => flags.log_file = Some(PathBuf::from(value)),
        _ => {}
    }
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "inkdesk".to_string(),
            "--watch".to_string(),
            "--read-only".to_string(),
            "--theme".to_string(),
            "dark".to_string(),
            "--log-file=inkdesk.log".to_string(),
            "--require-session".to_string(),
            "about.html".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.watch);
        assert!(flags.read_only);
        assert!(flags.require_session);
        assert_eq!(flags.theme, Some(ThemeMode::Dark));
        assert_eq!(flags.log_file, Some(PathBuf::from("inkdesk.log")));
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            theme: Some(ThemeMode::Light),
            placeholder: Some("from file".to_string()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            read_only: true,
            theme: Some(ThemeMode::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.read_only);
        assert_eq!(merged.theme, Some(ThemeMode::Dark));
        assert_eq!(merged.placeholder.as_deref(), Some("from file"));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".inkdeskrc");
        let flags = ConfigFlags {
            watch: true,
            read_only: true,
            require_session: true,
            theme: Some(ThemeMode::Dark),
            placeholder: Some("Tell people about us".to_string()),
            session_file: Some(PathBuf::from("session.json")),
            log_file: Some(PathBuf::from("inkdesk.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let flags = load_config_flags(&dir.path().join("nope")).unwrap();
        assert_eq!(flags, ConfigFlags::default());
    }
}
