// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime service id.
//!
//! `ServiceId` is the opaque id the runtime adapter hands back when a job
//! starts. Generated ids are exactly 23 bytes (`svc-` + 19-char nanoid) and
//! stored inline so the id stays `Copy`.

/// Maximum byte length for an inline id.
pub const ID_MAX_LEN: usize = 23;

/// Opaque id of a running service instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId {
    len: u8,
    buf: [u8; ID_MAX_LEN],
}

impl ServiceId {
    pub const PREFIX: &'static str = "svc-";

    /// Generate a new random id with the `svc-` prefix.
    pub fn generate() -> Self {
        Self::from_string(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19)))
    }

    /// Create an id from an existing string.
    ///
    /// Debug-asserts the string fits the inline buffer; longer input is
    /// truncated to [`ID_MAX_LEN`] bytes.
    pub fn from_string(id: impl AsRef<str>) -> Self {
        let s = id.as_ref();
        debug_assert!(
            s.len() <= ID_MAX_LEN,
            "service id exceeds {} bytes ({} bytes): {:?}",
            ID_MAX_LEN,
            s.len(),
            s,
        );
        let len = s.len().min(ID_MAX_LEN);
        let mut buf = [0u8; ID_MAX_LEN];
        buf[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { len: len as u8, buf }
    }

    pub fn as_str(&self) -> &str {
        // Invariant: only constructed from &str, always valid UTF-8.
        match std::str::from_utf8(&self.buf[..self.len as usize]) {
            Ok(s) => s,
            Err(_) => unreachable!("ServiceId constructed from non-UTF-8"),
        }
    }

    /// Returns the id suffix (without prefix) truncated to `n` characters.
    pub fn short(&self, n: usize) -> &str {
        let suffix = self.as_str().strip_prefix(Self::PREFIX).unwrap_or(self.as_str());
        &suffix[..n.min(suffix.len())]
    }
}

impl std::fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<&str> for ServiceId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl serde::Serialize for ServiceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for ServiceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <&str>::deserialize(deserializer)?;
        if s.len() > ID_MAX_LEN {
            return Err(serde::de::Error::custom(format!(
                "service id exceeds {} bytes: {:?}",
                ID_MAX_LEN, s
            )));
        }
        Ok(ServiceId::from_string(s))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
