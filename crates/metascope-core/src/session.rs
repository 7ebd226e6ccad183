use serde::{Deserialize, Serialize};

use crate::ids::ServerId;

/// Live-process registration published by every cluster component.
///
/// Sessions are JSON documents owned by the registering process; the console
/// only reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "ServerID")]
    pub server_id: ServerId,
    #[serde(rename = "ServerName")]
    pub server_name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Exclusive", default)]
    pub exclusive: bool,
    #[serde(rename = "Version", default)]
    pub version: String,
}

impl Session {
    /// Host part of the registered address.
    #[must_use]
    pub fn host(&self) -> &str {
        self.address
            .rsplit_once(':')
            .map_or(self.address.as_str(), |(host, _)| host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_registration_json() {
        let raw = r#"{"ServerID":3,"ServerName":"datacoord","Address":"10.0.0.4:13333","Exclusive":true}"#;
        let session: Session = serde_json::from_str(raw).expect("session json");
        assert_eq!(session.server_id, ServerId::new(3));
        assert_eq!(session.server_name, "datacoord");
        assert_eq!(session.host(), "10.0.0.4");
        assert!(session.version.is_empty());
    }
}
