//! Document Codec
//!
//! JSON encoding of [`ShuttleData`]. The store file uses the compact form;
//! export files are pretty printed with sorted keys so two exports of the
//! same data diff cleanly.

use super::types::ShuttleData;

/// Encode for the backing store file
pub fn encode(data: &ShuttleData) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(data)
}

/// Encode for an export file: sorted keys, pretty printed
pub fn encode_export(data: &ShuttleData) -> serde_json::Result<Vec<u8>> {
    // serde_json::Map is a BTreeMap here, so going through Value sorts every object
    let value = serde_json::to_value(data)?;
    serde_json::to_vec_pretty(&value)
}

/// Decode a store or export file.
///
/// Older layouts are accepted: host-only elements, settings without
/// `copySudoOnConnect`, documents without `exportSalt`.
pub fn decode(bytes: &[u8]) -> serde_json::Result<ShuttleData> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{AppSettings, Element, Project, Provider, TerminalApp};

    fn sample() -> ShuttleData {
        let mut project = Project::new("Web", Some("https://acme.example".to_string()));
        project
            .elements
            .push(Element::new("db1", "root", "10.0.0.5").with_sudo_password("secret"));
        project
            .elements
            .push(Element::new("web1", "deploy", "10.0.0.6").with_port(2222));

        let mut provider = Provider::new("Acme");
        provider.projects.push(project);

        let settings = AppSettings {
            terminal_app: TerminalApp::Ghostty,
            custom_terminal_path: None,
            copy_sudo_on_connect: false,
        };
        ShuttleData::new(vec![provider], settings)
    }

    #[test]
    fn test_roundtrip() {
        let data = sample();
        let decoded = decode(&encode(&data).unwrap()).unwrap();
        assert_eq!(decoded, data);

        let decoded = decode(&encode_export(&data).unwrap()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_legacy_host_becomes_ip() {
        let json = r#"{
            "providers": [{
                "id": "6F9619FF-8B86-D011-B42D-00CF4FC964FF",
                "name": "Acme",
                "projects": [{
                    "id": "7F9619FF-8B86-D011-B42D-00CF4FC964FF",
                    "name": "Web",
                    "elements": [{
                        "id": "8F9619FF-8B86-D011-B42D-00CF4FC964FF",
                        "name": "db1",
                        "user": "root",
                        "host": "10.0.0.5",
                        "port": 22
                    }]
                }]
            }],
            "settings": { "terminalApp": "Terminal" }
        }"#;

        let data = decode(json.as_bytes()).unwrap();
        let element = data.elements().next().unwrap();
        assert_eq!(element.ip, "10.0.0.5");
        assert_eq!(element.host, "");
        assert_eq!(element.connect_address(), "10.0.0.5");
    }

    #[test]
    fn test_host_kept_when_ip_present() {
        let json = r#"{
            "providers": [{
                "id": "6F9619FF-8B86-D011-B42D-00CF4FC964FF",
                "name": "Acme",
                "projects": [{
                    "id": "7F9619FF-8B86-D011-B42D-00CF4FC964FF",
                    "name": "Web",
                    "elements": [{
                        "id": "8F9619FF-8B86-D011-B42D-00CF4FC964FF",
                        "name": "db1",
                        "user": "root",
                        "host": "db1.acme.internal",
                        "ip": "10.0.0.5",
                        "port": 2200
                    }]
                }]
            }],
            "settings": { "terminalApp": "iTerm2" }
        }"#;

        let data = decode(json.as_bytes()).unwrap();
        let element = data.elements().next().unwrap();
        assert_eq!(element.host, "db1.acme.internal");
        assert_eq!(element.ip, "10.0.0.5");
        assert_eq!(element.port, 2200);
        assert_eq!(data.settings.terminal_app, TerminalApp::ITerm2);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let json = r#"{ "providers": [], "settings": { "terminalApp": "Warp" } }"#;

        let data = decode(json.as_bytes()).unwrap();
        assert!(data.settings.copy_sudo_on_connect);
        assert!(data.settings.custom_terminal_path.is_none());
        assert!(data.export_salt.is_none());
    }

    #[test]
    fn test_malformed_input_fails() {
        assert!(decode(b"not json").is_err());
        assert!(decode(b"[1, 2, 3]").is_err());
        assert!(decode(br#"{ "providers": [] }"#).is_err());
        assert!(decode(br#"{ "providers": [], "settings": { "terminalApp": "xterm" } }"#).is_err());
    }

    #[test]
    fn test_export_encoding_sorts_keys() {
        let text = String::from_utf8(encode_export(&sample()).unwrap()).unwrap();

        let providers = text.find("\"providers\"").unwrap();
        let settings = text.find("\"settings\"").unwrap();
        assert!(providers < settings);

        let copy_sudo = text.find("\"copySudoOnConnect\"").unwrap();
        let terminal = text.find("\"terminalApp\"").unwrap();
        assert!(copy_sudo < terminal);

        assert!(text.contains('\n'));
    }
}
