//! Host application and mixer control

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::actions::{ActionHandler, DispatchResult, HandlerError, Launcher, Platform};

/// Launch commands for one known application
struct KnownApp {
    name: &'static str,
    windows: &'static [&'static str],
    macos: &'static [&'static str],
    linux: &'static [&'static str],
}

static KNOWN_APPS: [KnownApp; 5] = [
    KnownApp {
        name: "calculator",
        windows: &["calc"],
        macos: &["open", "-a", "Calculator"],
        linux: &["gnome-calculator"],
    },
    KnownApp {
        name: "notepad",
        windows: &["notepad"],
        macos: &["open", "-a", "TextEdit"],
        linux: &["gedit"],
    },
    KnownApp {
        name: "browser",
        windows: &["cmd", "/C", "start", "https://www.google.com"],
        macos: &["open", "-a", "Safari"],
        linux: &["xdg-open", "https://www.google.com"],
    },
    KnownApp {
        name: "terminal",
        windows: &["cmd", "/C", "start", "cmd"],
        macos: &["open", "-a", "Terminal"],
        linux: &["x-terminal-emulator"],
    },
    KnownApp {
        name: "settings",
        windows: &["cmd", "/C", "start", "ms-settings:"],
        macos: &["open", "-b", "com.apple.systempreferences"],
        linux: &["gnome-control-center"],
    },
];

impl KnownApp {
    fn command(&self, platform: Platform) -> &'static [&'static str] {
        match platform {
            Platform::Windows => self.windows,
            Platform::MacOs => self.macos,
            Platform::Linux => self.linux,
        }
    }
}

fn split_argv<'a>(argv: &[&'a str]) -> Option<(&'a str, Vec<String>)> {
    let (program, args) = argv.split_first()?;
    Some((*program, args.iter().map(|a| a.to_string()).collect()))
}

/// Opens one of a fixed set of applications
pub struct OpenAppHandler {
    launcher: Arc<dyn Launcher>,
    platform: Platform,
}

impl OpenAppHandler {
    pub fn new(launcher: Arc<dyn Launcher>, platform: Platform) -> Self {
        Self { launcher, platform }
    }
}

#[async_trait]
impl ActionHandler for OpenAppHandler {
    fn name(&self) -> &'static str {
        "open_app"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        let Some(app) = KNOWN_APPS.iter().find(|app| utterance.contains(app.name)) else {
            return Ok(DispatchResult::reply("I'm not sure which application to open."));
        };

        info!(app = app.name, platform = ?self.platform, "opening application");
        let Some((program, args)) = split_argv(app.command(self.platform)) else {
            return Ok(DispatchResult::reply(format!("Opening {}", app.name)));
        };
        // The app outlives the command
        if let Err(e) = self.launcher.spawn_detached(program, &args).await {
            warn!(app = app.name, error = %e, "failed to open application");
            return Ok(DispatchResult::reply(format!(
                "Sorry, I couldn't open {}.",
                app.name
            )));
        }

        Ok(DispatchResult::reply(format!("Opening {}", app.name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VolumeChange {
    Up,
    Down,
    Mute,
    Unmute,
}

impl VolumeChange {
    fn parse(utterance: &str) -> Option<Self> {
        if utterance.contains("up") || utterance.contains("increase") {
            Some(VolumeChange::Up)
        } else if utterance.contains("down") || utterance.contains("decrease") {
            Some(VolumeChange::Down)
        } else if utterance.contains("unmute") {
            Some(VolumeChange::Unmute)
        } else if utterance.contains("mute") {
            Some(VolumeChange::Mute)
        } else {
            None
        }
    }

    fn confirmation(self) -> &'static str {
        match self {
            VolumeChange::Up => "Volume increased",
            VolumeChange::Down => "Volume decreased",
            VolumeChange::Mute => "Muted",
            VolumeChange::Unmute => "Unmuted",
        }
    }

    fn command(self, platform: Platform) -> &'static [&'static str] {
        match (platform, self) {
            (Platform::Windows, VolumeChange::Up) => &["nircmd.exe", "changesysvolume", "5000"],
            (Platform::Windows, VolumeChange::Down) => &["nircmd.exe", "changesysvolume", "-5000"],
            (Platform::Windows, VolumeChange::Mute) => &["nircmd.exe", "mutesysvolume", "1"],
            (Platform::Windows, VolumeChange::Unmute) => &["nircmd.exe", "mutesysvolume", "0"],
            (Platform::MacOs, VolumeChange::Up) => &[
                "osascript",
                "-e",
                "set volume output volume ((output volume of (get volume settings)) + 10)",
            ],
            (Platform::MacOs, VolumeChange::Down) => &[
                "osascript",
                "-e",
                "set volume output volume ((output volume of (get volume settings)) - 10)",
            ],
            (Platform::MacOs, VolumeChange::Mute) => {
                &["osascript", "-e", "set volume output muted true"]
            }
            (Platform::MacOs, VolumeChange::Unmute) => {
                &["osascript", "-e", "set volume output muted false"]
            }
            (Platform::Linux, VolumeChange::Up) => &["amixer", "-q", "set", "Master", "10%+"],
            (Platform::Linux, VolumeChange::Down) => &["amixer", "-q", "set", "Master", "10%-"],
            (Platform::Linux, VolumeChange::Mute) => &["amixer", "-q", "set", "Master", "mute"],
            (Platform::Linux, VolumeChange::Unmute) => {
                &["amixer", "-q", "set", "Master", "unmute"]
            }
        }
    }
}

/// Adjusts the system output volume
pub struct VolumeHandler {
    launcher: Arc<dyn Launcher>,
    platform: Platform,
}

impl VolumeHandler {
    pub fn new(launcher: Arc<dyn Launcher>, platform: Platform) -> Self {
        Self { launcher, platform }
    }
}

#[async_trait]
impl ActionHandler for VolumeHandler {
    fn name(&self) -> &'static str {
        "volume"
    }

    async fn handle(&self, utterance: &str) -> Result<DispatchResult, HandlerError> {
        let Some(change) = VolumeChange::parse(utterance) else {
            return Ok(DispatchResult::reply(
                "Should I turn the volume up, down, or mute it?",
            ));
        };

        if let Some((program, args)) = split_argv(change.command(self.platform)) {
            self.launcher.run(program, &args).await?;
        }
        Ok(DispatchResult::reply(change.confirmation()))
    }
}

/// Placeholder for host power and session commands
pub struct SystemHandler;

#[async_trait]
impl ActionHandler for SystemHandler {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn handle(&self, _utterance: &str) -> Result<DispatchResult, HandlerError> {
        Ok(DispatchResult::reply(
            "System commands are not configured on this device.",
        ))
    }
}
