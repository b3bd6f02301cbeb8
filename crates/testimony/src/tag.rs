//! Identifier and tag helpers for report records.
//!
//! Stateless wrappers around platform primitives. No format contract
//! beyond "opaque stable token".

use std::fmt::Write;

use md5::{Digest, Md5};

/// Hex MD5 digest of the concatenated UTF-8 parts.
///
/// Used to derive stable content ids for steps and attachments.
#[must_use]
pub fn md5(parts: &[&str]) -> String {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    bytes_to_hex(&hasher.finalize())
}

/// A random unique id in canonical hyphenated form.
#[must_use]
pub fn uuid4() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current wall-clock time in whole milliseconds since the Unix epoch.
#[must_use]
pub fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Tag identifying the current process and thread, `{pid}-{thread}`.
#[must_use]
pub fn thread_tag() -> String {
    let thread = std::thread::current();
    let name = thread
        .name()
        .map_or_else(|| format!("{:?}", thread.id()), ToOwned::to_owned);
    format!("{}-{}", std::process::id(), name)
}

/// Tag identifying the host the tests run on.
///
/// Read from the environment; falls back to `localhost` when the platform
/// exposes no hostname variable.
#[must_use]
pub fn host_tag() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_owned())
}

/// Label for the platform the tests run on, `{os}-{arch}`.
#[must_use]
pub fn platform_label() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(hex, "{byte:02x}").expect("writing to a String never fails");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_known_digest() {
        assert_eq!(md5(&["hello"]), "5d41402abc4b2a76b9719d911017c592");
        // Concatenation, not per-part hashing
        assert_eq!(md5(&["he", "llo"]), md5(&["hello"]));
    }

    #[test]
    fn uuid4_is_hyphenated_and_unique() {
        let a = uuid4();
        let b = uuid4();
        assert_eq!(a.len(), 36);
        assert_eq!(a.matches('-').count(), 4);
        assert_ne!(a, b);
    }

    #[test]
    fn tags_are_non_empty() {
        assert!(now() > 0);
        assert!(!thread_tag().is_empty());
        assert!(!host_tag().is_empty());
        assert!(platform_label().contains('-'));
    }
}
