//! Context probe: selection, foreground application, terminal directory
//!
//! Every signal is best-effort. A missing tool, a denied automation
//! permission or an unsupported terminal all degrade to `None`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::RawContext;
use crate::config::ContextConfig;

/// Upper bound for any single external query
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Terminals with an emulator-specific directory lookup
const SCRIPTED_TERMINALS: [&str; 2] = ["Terminal", "iTerm2"];

const FRONTMOST_APP_SCRIPT: &str =
    r#"tell application "System Events" to get name of first application process whose frontmost is true"#;

const TERMINAL_CUSTOM_TITLE_SCRIPT: &str =
    r#"tell application "Terminal" to get custom title of selected tab of front window"#;

const TERMINAL_WINDOW_NAME_SCRIPT: &str =
    r#"tell application "Terminal" to get name of front window"#;

const ITERM_PATH_SCRIPT: &str = r#"tell application "iTerm2" to tell current session of current window to get variable named "session.path""#;

const ITERM_NAME_SCRIPT: &str =
    r#"tell application "iTerm2" to tell current session of current window to get name"#;

/// OS-level queries the probe relies on
#[async_trait]
pub trait Environment: Send + Sync {
    /// Text the user currently has selected
    async fn selected_text(&self) -> Option<String>;

    /// Display name of the application the user is working in
    async fn foreground_application(&self) -> Option<String>;

    /// Working directory shown by the given terminal emulator
    async fn terminal_directory(&self, app: &str) -> Option<String>;
}

/// Collects a [`RawContext`] for each request
pub struct ContextProbe {
    environment: Box<dyn Environment>,
    terminals: Vec<String>,
    enabled: bool,
}

impl ContextProbe {
    pub fn from_config(config: &ContextConfig, environment: Box<dyn Environment>) -> Self {
        Self {
            environment,
            terminals: config.terminals.clone(),
            enabled: config.enabled,
        }
    }

    /// Disable probing entirely; `acquire` then always yields an empty context
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub async fn acquire(&self) -> RawContext {
        if !self.enabled {
            return RawContext::default();
        }

        let selected_text = self.environment.selected_text().await;
        let foreground_app = self.environment.foreground_application().await;

        let working_directory = match &foreground_app {
            Some(app) if self.terminals.iter().any(|t| t == app) => {
                self.environment.terminal_directory(app).await
            }
            _ => None,
        };

        debug!(
            app = ?foreground_app,
            directory = ?working_directory,
            selection_chars = selected_text.as_ref().map(|s| s.chars().count()),
            "Context acquired"
        );

        RawContext {
            selected_text,
            foreground_app,
            working_directory,
        }
    }
}

/// Probes the real machine through small helper programs
#[derive(Debug, Default)]
pub struct SystemEnvironment {
    piped_selection: Option<String>,
}

impl SystemEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use text piped on stdin as the selection instead of querying the desktop
    pub fn with_selection(text: String) -> Self {
        Self {
            piped_selection: Some(text),
        }
    }

    async fn apple_terminal_directory(&self) -> Option<String> {
        if !cfg!(target_os = "macos") {
            return None;
        }
        if let Some(dir) = run_quiet("osascript", &["-e", TERMINAL_CUSTOM_TITLE_SCRIPT])
            .await
            .and_then(|title| directory_from_title(&title))
        {
            return Some(dir);
        }
        let title = run_quiet("osascript", &["-e", TERMINAL_WINDOW_NAME_SCRIPT]).await?;
        directory_from_title(&title)
    }

    async fn iterm_directory(&self) -> Option<String> {
        if !cfg!(target_os = "macos") {
            return None;
        }
        if let Some(path) = run_quiet("osascript", &["-e", ITERM_PATH_SCRIPT]).await {
            return Some(abbreviate_home(Path::new(&path), home_dir().as_deref()));
        }
        let title = run_quiet("osascript", &["-e", ITERM_NAME_SCRIPT]).await?;
        directory_from_title(&title)
    }
}

#[async_trait]
impl Environment for SystemEnvironment {
    async fn selected_text(&self) -> Option<String> {
        if let Some(text) = &self.piped_selection {
            return non_blank(text);
        }
        if cfg!(target_os = "linux") {
            if let Some(text) = run_quiet("wl-paste", &["--primary", "--no-newline"]).await {
                return Some(text);
            }
            return run_quiet("xclip", &["-o", "-selection", "primary"]).await;
        }
        None
    }

    async fn foreground_application(&self) -> Option<String> {
        let probed = if cfg!(target_os = "macos") {
            run_quiet("osascript", &["-e", FRONTMOST_APP_SCRIPT]).await
        } else if cfg!(target_os = "linux") {
            run_quiet("xdotool", &["getactivewindow", "getwindowclassname"])
                .await
                .map(|class| window_class_name(&class))
        } else {
            None
        };

        probed.or_else(|| hosting_terminal().map(String::from))
    }

    async fn terminal_directory(&self, app: &str) -> Option<String> {
        let scripted = match app {
            "Terminal" => self.apple_terminal_directory().await,
            "iTerm2" => self.iterm_directory().await,
            _ => None,
        };
        if scripted.is_some() {
            return scripted;
        }

        // We only know our own cwd, so it stands in for the terminal that hosts us.
        let hosted_here = hosting_terminal() == Some(app);
        let scriptable = cfg!(target_os = "macos") && SCRIPTED_TERMINALS.contains(&app);
        if hosted_here || !scriptable {
            let cwd = std::env::current_dir().ok()?;
            return Some(abbreviate_home(&cwd, home_dir().as_deref()));
        }
        None
    }
}

/// Terminal emulator this process runs in, from `TERM_PROGRAM`
fn hosting_terminal() -> Option<&'static str> {
    std::env::var("TERM_PROGRAM")
        .ok()
        .and_then(|program| terminal_program_name(&program))
}

fn terminal_program_name(term_program: &str) -> Option<&'static str> {
    match term_program {
        "Apple_Terminal" => Some("Terminal"),
        "iTerm.app" => Some("iTerm2"),
        "vscode" => Some("Visual Studio Code"),
        "WarpTerminal" => Some("Warp"),
        "WezTerm" => Some("WezTerm"),
        "ghostty" => Some("Ghostty"),
        "Hyper" => Some("Hyper"),
        _ => None,
    }
}

/// Display name for an X11 window class; unknown classes pass through
fn window_class_name(class: &str) -> String {
    let name = match class.to_lowercase().as_str() {
        "gnome-terminal-server" | "gnome-terminal" => "Terminal",
        "org.wezfurlong.wezterm" | "wezterm" | "wezterm-gui" => "WezTerm",
        "alacritty" => "Alacritty",
        "kitty" => "kitty",
        "com.mitchellh.ghostty" | "ghostty" => "Ghostty",
        "hyper" => "Hyper",
        "warp" | "dev.warp.warp" => "Warp",
        "code" | "code-oss" | "vscodium" => "Code",
        "cursor" => "Cursor",
        "zed" | "dev.zed.zed" => "Zed",
        "sublime_text" => "Sublime Text",
        "jetbrains-idea" | "jetbrains-idea-ce" => "IntelliJ IDEA",
        "jetbrains-pycharm" | "jetbrains-pycharm-ce" => "PyCharm",
        "jetbrains-webstorm" => "WebStorm",
        "jetbrains-goland" => "GoLand",
        "jetbrains-rustrover" => "RustRover",
        "jetbrains-clion" => "CLion",
        "jetbrains-studio" => "Android Studio",
        _ => return class.to_string(),
    };
    name.to_string()
}

/// Pick the first title segment that looks like a path.
///
/// Handles the common shapes `~/src — -zsh — 80×24` and `me@host: /var/log`.
pub(crate) fn directory_from_title(title: &str) -> Option<String> {
    title
        .split(" — ")
        .flat_map(|segment| segment.split(" - "))
        .flat_map(|segment| segment.split(": "))
        .map(str::trim)
        .find(|segment| segment.starts_with('/') || segment.starts_with('~'))
        .map(String::from)
}

pub(crate) fn abbreviate_home(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

fn home_dir() -> Option<std::path::PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    if trimmed.trim().is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Run a helper program and return its trimmed stdout, or `None` on any failure
async fn run_quiet(program: &str, args: &[&str]) -> Option<String> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(PROBE_TIMEOUT, child).await {
        Ok(Ok(output)) if output.status.success() => {
            non_blank(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(Ok(output)) => {
            debug!(program, status = %output.status, "Probe exited unsuccessfully");
            None
        }
        Ok(Err(e)) => {
            debug!(program, error = %e, "Probe could not start");
            None
        }
        Err(_) => {
            debug!(program, "Probe timed out");
            None
        }
    }
}

/// Scripted environment for tests
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct FakeEnvironment {
    pub selection: Option<String>,
    pub app: Option<String>,
    pub directory: Option<String>,
    pub directory_queries: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
#[async_trait]
impl Environment for FakeEnvironment {
    async fn selected_text(&self) -> Option<String> {
        self.selection.clone()
    }

    async fn foreground_application(&self) -> Option<String> {
        self.app.clone()
    }

    async fn terminal_directory(&self, _app: &str) -> Option<String> {
        self.directory_queries
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.directory.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn probe(env: FakeEnvironment) -> ContextProbe {
        ContextProbe::from_config(&ContextConfig::default(), Box::new(env))
    }

    #[tokio::test]
    async fn test_directory_only_for_terminals() {
        let env = FakeEnvironment {
            app: Some("Safari".to_string()),
            directory: Some("~/project".to_string()),
            ..Default::default()
        };
        let queries = env.directory_queries.clone();

        let raw = probe(env).acquire().await;
        assert_eq!(raw.foreground_app.as_deref(), Some("Safari"));
        assert!(raw.working_directory.is_none());
        assert_eq!(queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_terminal_directory_is_queried() {
        let env = FakeEnvironment {
            app: Some("Terminal".to_string()),
            directory: Some("~/project".to_string()),
            selection: Some("error: linker failed".to_string()),
            ..Default::default()
        };

        let raw = probe(env).acquire().await;
        assert_eq!(raw.working_directory.as_deref(), Some("~/project"));
        assert_eq!(raw.selected_text.as_deref(), Some("error: linker failed"));
    }

    #[tokio::test]
    async fn test_absent_signals_are_not_errors() {
        let raw = probe(FakeEnvironment::default()).acquire().await;
        assert_eq!(raw, RawContext::default());
    }

    #[tokio::test]
    async fn test_disabled_probe_collects_nothing() {
        let env = FakeEnvironment {
            app: Some("Terminal".to_string()),
            directory: Some("~/project".to_string()),
            ..Default::default()
        };
        let raw = probe(env).disabled().acquire().await;
        assert_eq!(raw, RawContext::default());
    }

    #[test]
    fn test_directory_from_title() {
        assert_eq!(
            directory_from_title("~/project — -zsh — 80×24").as_deref(),
            Some("~/project")
        );
        assert_eq!(directory_from_title("me@host: /var/log").as_deref(), Some("/var/log"));
        assert_eq!(directory_from_title("~/my-app - zsh").as_deref(), Some("~/my-app"));
        assert_eq!(directory_from_title("vim notes.txt"), None);
    }

    #[test]
    fn test_abbreviate_home() {
        let home = Path::new("/Users/dev");
        assert_eq!(abbreviate_home(Path::new("/Users/dev/src/app"), Some(home)), "~/src/app");
        assert_eq!(abbreviate_home(Path::new("/Users/dev"), Some(home)), "~");
        assert_eq!(abbreviate_home(Path::new("/tmp"), Some(home)), "/tmp");
        assert_eq!(abbreviate_home(Path::new("/tmp"), None), "/tmp");
    }

    #[test]
    fn test_terminal_program_names() {
        assert_eq!(terminal_program_name("Apple_Terminal"), Some("Terminal"));
        assert_eq!(terminal_program_name("iTerm.app"), Some("iTerm2"));
        assert_eq!(terminal_program_name("tmux"), None);
    }

    #[test]
    fn test_window_class_names() {
        let config = ContextConfig::default();
        for class in ["gnome-terminal-server", "org.wezfurlong.wezterm", "Alacritty", "kitty"] {
            let name = window_class_name(class);
            assert!(config.terminals.contains(&name), "{class} -> {name}");
        }
        assert_eq!(window_class_name("code"), "Code");
        assert!(config.developer_apps.contains(&window_class_name("jetbrains-idea")));
        assert_eq!(window_class_name("firefox"), "firefox");
    }

    #[tokio::test]
    async fn test_piped_selection_wins() {
        let env = SystemEnvironment::with_selection("line one\nline two\n".to_string());
        assert_eq!(env.selected_text().await.as_deref(), Some("line one\nline two"));

        let blank = SystemEnvironment::with_selection("  \n".to_string());
        assert!(blank.selected_text().await.is_none());
    }
}
