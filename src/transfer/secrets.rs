//! Secret fields across a whole document
//!
//! A sudo password is either absent, plaintext (live store), or
//! `enc:<base64 blob>` inside a password protected export file.

use crate::config::types::ShuttleData;

use super::crypto::{decrypt_field, encrypt_field, FieldKey};
use super::error::TransferError;

/// Marks a sealed secret in an export file
pub const ENC_PREFIX: &str = "enc:";

/// Marker written by early exporters that only base64 encoded secrets
pub const LEGACY_PREFIX: &str = "b64:";

/// Whether a secret value is still sealed
pub fn is_sealed(value: &str) -> bool {
    value.starts_with(ENC_PREFIX)
}

fn is_marked(value: &str) -> bool {
    value.starts_with(ENC_PREFIX) || value.starts_with(LEGACY_PREFIX)
}

/// Whether any element of `data` carries a sealed sudo password
pub fn has_sealed_secrets(data: &ShuttleData) -> bool {
    data.elements()
        .any(|e| e.sudo_password.as_deref().is_some_and(is_sealed))
}

/// Seal every non-empty sudo password in place. Returns the number sealed.
///
/// Call on a copy; the live document must keep its plaintext.
pub fn seal_secrets(data: &mut ShuttleData, key: &FieldKey) -> Result<usize, TransferError> {
    let mut sealed = 0;

    for element in data.elements_mut() {
        let Some(password) = element.sudo_password.as_mut() else {
            continue;
        };
        if password.is_empty() {
            continue;
        }

        *password = format!("{}{}", ENC_PREFIX, encrypt_field(password, key)?);
        sealed += 1;
    }

    Ok(sealed)
}

/// Open every sealed sudo password.
///
/// Takes the document by value: on the first failure the partly opened
/// document is dropped and nothing of it can leak into the store.
pub fn unseal_secrets(mut data: ShuttleData, key: &FieldKey) -> Result<ShuttleData, TransferError> {
    for element in data.elements_mut() {
        let Some(blob) = element.sudo_password.as_deref().and_then(|p| p.strip_prefix(ENC_PREFIX))
        else {
            continue;
        };

        let plaintext = decrypt_field(blob, key)?;
        element.sudo_password = Some(plaintext);
    }

    Ok(data)
}

/// Drop sudo passwords that still carry an encryption marker.
///
/// Such a value can only come from importing sealed data without opening it;
/// it is not a usable password. Returns the number of fields cleared.
pub fn sanitize_secrets(data: &mut ShuttleData) -> usize {
    let mut cleared = 0;

    for element in data.elements_mut() {
        if element.sudo_password.as_deref().is_some_and(is_marked) {
            element.sudo_password = None;
            cleared += 1;
        }
    }

    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{AppSettings, Element, Project, Provider};
    use crate::transfer::crypto::{derive_key, generate_salt};

    fn document(passwords: &[Option<&str>]) -> ShuttleData {
        let mut project = Project::new("Web", None);
        for (i, password) in passwords.iter().enumerate() {
            let mut element = Element::new(format!("host{}", i), "root", format!("10.0.0.{}", i));
            element.sudo_password = password.map(str::to_string);
            project.elements.push(element);
        }

        let mut provider = Provider::new("Acme");
        provider.projects.push(project);
        ShuttleData::new(vec![provider], AppSettings::default())
    }

    fn passwords(data: &ShuttleData) -> Vec<Option<String>> {
        data.elements().map(|e| e.sudo_password.clone()).collect()
    }

    #[test]
    fn test_seal_skips_absent_and_empty() {
        let key = derive_key("hunter2", &generate_salt());
        let mut data = document(&[Some("secret"), None, Some("")]);

        let sealed = seal_secrets(&mut data, &key).unwrap();
        assert_eq!(sealed, 1);

        let values = passwords(&data);
        assert!(values[0].as_deref().unwrap().starts_with(ENC_PREFIX));
        assert_eq!(values[1], None);
        assert_eq!(values[2].as_deref(), Some(""));
        assert!(has_sealed_secrets(&data));
    }

    #[test]
    fn test_seal_unseal_roundtrip() {
        let key = derive_key("hunter2", &generate_salt());
        let original = document(&[Some("secret"), None, Some("other")]);

        let mut sealed = original.clone();
        seal_secrets(&mut sealed, &key).unwrap();

        let opened = unseal_secrets(sealed, &key).unwrap();
        assert_eq!(opened, original);
        assert!(!has_sealed_secrets(&opened));
    }

    #[test]
    fn test_unseal_fails_as_a_whole() {
        let salt = generate_salt();
        let key = derive_key("hunter2", &salt);
        let mut data = document(&[Some("one"), Some("two")]);
        seal_secrets(&mut data, &key).unwrap();

        // Second field sealed under a different key
        let other = derive_key("other", &salt);
        if let Some(element) = data.elements_mut().nth(1) {
            element.sudo_password = Some(format!("{}{}", ENC_PREFIX, encrypt_field("two", &other).unwrap()));
        }

        let result = unseal_secrets(data, &key);
        assert!(matches!(result, Err(TransferError::DecryptionFailed)));
    }

    #[test]
    fn test_sanitize_strips_marked_values() {
        let mut data = document(&[Some("enc:AAAA"), Some("b64:c2VjcmV0"), Some("plain"), None]);

        assert_eq!(sanitize_secrets(&mut data), 2);
        assert_eq!(
            passwords(&data),
            vec![None, None, Some("plain".to_string()), None]
        );
        assert_eq!(sanitize_secrets(&mut data), 0);
    }
}
