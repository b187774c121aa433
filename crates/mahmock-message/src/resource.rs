// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote binary asset references shared by image and voice segments, and
//! the presence-preserving optional field they are built from.

use serde::{Deserialize, Deserializer, Serialize};

/// An optional wire field that remembers how it was absent.
///
/// `None` means the key was missing, `Some(None)` means it was sent as an
/// explicit `null`. Rendering reproduces whichever form was parsed.
pub type Nullable<T> = Option<Option<T>>;

/// Deserializer for [`Nullable`] fields; pair with `default` and
/// `skip_serializing_if = "Option::is_none"`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Where the bytes of an image or voice clip live.
///
/// Every field is optional on input. A fetched resource may carry several at
/// once (the server can return id, url, and base64 together).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub url: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub path: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub base64: Nullable<String>,
}

impl RemoteResource {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(Some(url.into())),
            ..Self::default()
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(Some(path.into())),
            ..Self::default()
        }
    }

    pub fn from_base64(data: impl Into<String>) -> Self {
        Self {
            base64: Some(Some(data.into())),
            ..Self::default()
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_ref().and_then(|v| v.as_deref())
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_ref().and_then(|v| v.as_deref())
    }

    pub fn base64(&self) -> Option<&str> {
        self.base64.as_ref().and_then(|v| v.as_deref())
    }

    /// True when no location at all is given.
    pub fn is_empty(&self) -> bool {
        self.url().is_none() && self.path().is_none() && self.base64().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let value = serde_json::to_value(RemoteResource::from_url("http://x/y.png")).unwrap();
        assert_eq!(value, json!({"url": "http://x/y.png"}));
    }

    #[test]
    fn all_fields_optional_on_input() {
        let res: RemoteResource = serde_json::from_value(json!({})).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn explicit_null_is_kept_apart_from_absent() {
        let raw = json!({"url": "http://x/y.png", "path": null});
        let res: RemoteResource = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(res.url(), Some("http://x/y.png"));
        assert_eq!(res.path, Some(None));
        assert_eq!(res.base64, None);
        assert_eq!(serde_json::to_value(&res).unwrap(), raw);
    }
}
