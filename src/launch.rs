//! Terminal Launch Handoff
//!
//! The store resolves an element into a [`ConnectionDescriptor`] and hands it
//! to a [`TerminalLauncher`]. How a given terminal emulator is driven lives
//! behind that trait.

use crate::config::types::{AppSettings, Element, TerminalApp, DEFAULT_SSH_PORT};

/// Everything a launcher needs to open one connection
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub name: String,
    pub user: String,
    pub address: String,
    pub port: u16,
    /// Present only when the user opted into copying it on connect
    pub sudo_password: Option<String>,
}

// Keep the secret out of logs
impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("sudo_password", &self.sudo_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConnectionDescriptor {
    pub fn resolve(element: &Element, settings: &AppSettings) -> Self {
        let sudo_password = if settings.copy_sudo_on_connect {
            element.sudo_password.clone().filter(|p| !p.is_empty())
        } else {
            None
        };

        Self {
            name: element.name.clone(),
            user: element.user.clone(),
            address: element.connect_address().to_string(),
            port: element.port,
            sudo_password,
        }
    }

    /// `ssh [-p PORT] user@address`
    pub fn ssh_command(&self) -> String {
        let mut parts = vec!["ssh".to_string()];
        if self.port != DEFAULT_SSH_PORT {
            parts.push(format!("-p {}", self.port));
        }
        parts.push(format!("{}@{}", self.user, self.address));
        parts.join(" ")
    }
}

/// ssh command line for an element
pub fn ssh_command(element: &Element) -> String {
    ConnectionDescriptor::resolve(element, &AppSettings::default()).ssh_command()
}

/// Opens a connection in a terminal emulator. Fire-and-forget: failures are
/// the launcher's to report.
pub trait TerminalLauncher {
    fn launch(
        &self,
        connection: &ConnectionDescriptor,
        terminal: TerminalApp,
        custom_terminal: Option<&str>,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_command_default_port() {
        let element = Element::new("db1", "root", "10.0.0.5");
        assert_eq!(ssh_command(&element), "ssh root@10.0.0.5");
    }

    #[test]
    fn test_ssh_command_custom_port_and_host_fallback() {
        let mut element = Element::new("db1", "admin", "").with_port(2222);
        element.host = "db1.example.com".to_string();
        assert_eq!(ssh_command(&element), "ssh -p 2222 admin@db1.example.com");
    }

    #[test]
    fn test_sudo_password_follows_setting() {
        let element = Element::new("db1", "root", "10.0.0.5").with_sudo_password("secret");
        let mut settings = AppSettings::default();

        let descriptor = ConnectionDescriptor::resolve(&element, &settings);
        assert_eq!(descriptor.sudo_password.as_deref(), Some("secret"));
        assert!(!format!("{:?}", descriptor).contains("secret"));

        settings.copy_sudo_on_connect = false;
        let descriptor = ConnectionDescriptor::resolve(&element, &settings);
        assert!(descriptor.sudo_password.is_none());
    }
}
