use serde::Serialize;

/// Identity constants of the firmware built on top of this crate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareInfo {
    pub name: String,
    pub short_name: String,
    pub maker: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
}

impl FirmwareInfo {
    /// Describes this crate's own binary
    pub fn from_package() -> Self {
        FirmwareInfo {
            name: env!("CARGO_PKG_DESCRIPTION").to_string(),
            short_name: env!("CARGO_PKG_NAME").to_string(),
            maker: "fieldnode".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            github_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_camel_case_and_skips_missing_url() {
        let fw = FirmwareInfo {
            name: "Dimmer".into(),
            short_name: "dim".into(),
            maker: "Acme".into(),
            version: "1.2.3".into(),
            github_url: None,
        };
        assert_eq!(
            serde_json::to_value(&fw).unwrap(),
            json!({"name": "Dimmer", "shortName": "dim", "maker": "Acme", "version": "1.2.3"})
        );
    }
}
