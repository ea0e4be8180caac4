use serde::Deserialize;

use crate::error::{Error, MISSING_KEYS_MESSAGE};

/// Raw request body; both fields are optional so that a missing key is
/// reported as invalid input instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
}

impl SummaryRequest {
    pub fn validate(self) -> Result<Credentials, Error> {
        let public_key = non_blank(self.public_key);
        let private_key = non_blank(self.private_key);

        match (public_key, private_key) {
            (Some(public_key), Some(private_key)) => Ok(Credentials {
                public_key,
                private_key,
            }),
            _ => Err(Error::InvalidInput(String::from(MISSING_KEYS_MESSAGE))),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// API key pair for one summary request. Never persisted or logged.
#[derive(Clone)]
pub struct Credentials {
    pub public_key: String,
    /// base64 encoded secret
    pub private_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &"<redacted>")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(public_key: Option<&str>, private_key: Option<&str>) -> SummaryRequest {
        SummaryRequest {
            public_key: public_key.map(String::from),
            private_key: private_key.map(String::from),
        }
    }

    #[test]
    fn test_validate() {
        let credentials = request(Some(" key "), Some("c2VjcmV0"))
            .validate()
            .unwrap();
        assert_eq!(credentials.public_key, "key");
        assert_eq!(credentials.private_key, "c2VjcmV0");

        for req in [
            request(None, Some("c2VjcmV0")),
            request(Some("key"), None),
            request(Some("   "), Some("c2VjcmV0")),
            request(Some("key"), Some("")),
            SummaryRequest::default(),
        ] {
            match req.validate() {
                Err(Error::InvalidInput(message)) => {
                    assert_eq!(message, MISSING_KEYS_MESSAGE)
                },
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_debug_redacts() {
        let credentials = request(Some("pk-live-123"), Some("c2VjcmV0"))
            .validate()
            .unwrap();
        let printed = format!("{:?}", credentials);
        assert!(!printed.contains("pk-live-123"));
        assert!(!printed.contains("c2VjcmV0"));
    }
}
