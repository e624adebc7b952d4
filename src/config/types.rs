//! Connection Book Types
//!
//! Provider → Project → Element hierarchy plus application settings.
//! Field names on the wire are camelCase to stay readable by existing
//! store and export files.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_true() -> bool {
    true
}

/// A single SSH host entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ElementRecord", rename_all = "camelCase")]
pub struct Element {
    pub id: Uuid,
    pub name: String,
    pub user: String,
    /// Legacy hostname, kept for display and as a fallback address
    pub host: String,
    /// Preferred connect address
    pub ip: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sudo_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Element {
    /// Create an element with a fresh id and no legacy host
    pub fn new(name: impl Into<String>, user: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            user: user.into(),
            host: String::new(),
            ip: ip.into(),
            port: DEFAULT_SSH_PORT,
            sudo_password: None,
            notes: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_sudo_password(mut self, password: impl Into<String>) -> Self {
        self.sudo_password = Some(password.into());
        self
    }

    /// Address used for the SSH connection: ip if set, otherwise host
    pub fn connect_address(&self) -> &str {
        if self.ip.is_empty() {
            &self.host
        } else {
            &self.ip
        }
    }
}

/// Element as it appears on disk, before the host → ip migration.
///
/// Files written before `ip` existed stored the address in `host`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementRecord {
    id: Uuid,
    name: String,
    user: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    sudo_password: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<ElementRecord> for Element {
    fn from(record: ElementRecord) -> Self {
        let (host, ip) = match record.ip {
            Some(ip) => (record.host, ip),
            None => (String::new(), record.host),
        };

        Self {
            id: record.id,
            name: record.name,
            user: record.user,
            host,
            ip,
            port: record.port,
            sudo_password: record.sudo_password,
            notes: record.notes,
        }
    }
}

/// A group of hosts belonging to one project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Project {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            url,
            elements: Vec::new(),
        }
    }
}

/// Top level grouping (hosting provider, customer, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            projects: Vec::new(),
        }
    }
}

/// Terminal emulator used to open connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerminalApp {
    #[default]
    Terminal,
    #[serde(rename = "iTerm2")]
    ITerm2,
    Warp,
    Ghostty,
    Alacritty,
    Custom,
}

impl TerminalApp {
    pub const ALL: [TerminalApp; 6] = [
        TerminalApp::Terminal,
        TerminalApp::ITerm2,
        TerminalApp::Warp,
        TerminalApp::Ghostty,
        TerminalApp::Alacritty,
        TerminalApp::Custom,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TerminalApp::Terminal => "Terminal",
            TerminalApp::ITerm2 => "iTerm2",
            TerminalApp::Warp => "Warp",
            TerminalApp::Ghostty => "Ghostty",
            TerminalApp::Alacritty => "Alacritty",
            TerminalApp::Custom => "Custom",
        }
    }

    /// macOS bundle identifier; `None` for a user supplied terminal
    pub fn bundle_identifier(&self) -> Option<&'static str> {
        match self {
            TerminalApp::Terminal => Some("com.apple.Terminal"),
            TerminalApp::ITerm2 => Some("com.googlecode.iterm2"),
            TerminalApp::Warp => Some("dev.warp.Warp-Stable"),
            TerminalApp::Ghostty => Some("com.mitchellh.ghostty"),
            TerminalApp::Alacritty => Some("org.alacritty"),
            TerminalApp::Custom => None,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub terminal_app: TerminalApp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_terminal_path: Option<String>,
    /// Missing in files written before the option existed
    #[serde(default = "default_true")]
    pub copy_sudo_on_connect: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            terminal_app: TerminalApp::default(),
            custom_terminal_path: None,
            copy_sudo_on_connect: true,
        }
    }
}

/// Root document: the whole store, or the contents of an export file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShuttleData {
    pub providers: Vec<Provider>,
    pub settings: AppSettings,
    /// Base64 salt, only present in password protected export files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_salt: Option<String>,
}

impl ShuttleData {
    pub fn new(providers: Vec<Provider>, settings: AppSettings) -> Self {
        Self {
            providers,
            settings,
            export_salt: None,
        }
    }

    /// Iterate over every element in the tree
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.providers
            .iter()
            .flat_map(|p| p.projects.iter())
            .flat_map(|pr| pr.elements.iter())
    }

    /// Mutable counterpart of [`ShuttleData::elements`]
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.providers
            .iter_mut()
            .flat_map(|p| p.projects.iter_mut())
            .flat_map(|pr| pr.elements.iter_mut())
    }
}
