//! MQTT topic scheme.
//!
//! Topic structure: `{prefix}/{typeSegment}/{deviceId}/{attributeKey}`,
//! e.g. `tradfri/lightbulb/7/dimmer`.

/// Topic prefix used when none is configured.
pub const DEFAULT_TOPIC_PREFIX: &str = "tradfri";

/// Topic scheme configuration.
#[derive(Debug, Clone)]
pub struct TopicScheme {
    /// Topic prefix (default: "tradfri")
    pub prefix: String,
}

impl Default for TopicScheme {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_TOPIC_PREFIX.to_string(),
        }
    }
}

impl TopicScheme {
    /// Create a topic scheme with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Build the base topic path for one device.
    #[must_use]
    pub fn device_base(&self, type_segment: &str, device_id: u32) -> String {
        format!("{}/{}/{}", self.prefix, type_segment, device_id)
    }
}

/// Build the full topic path for one attribute under a device base path.
#[must_use]
pub fn attribute_path(base: &str, key: &str) -> String {
    format!("{base}/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceType;

    #[test]
    fn base_path_layout() {
        let scheme = TopicScheme::default();
        let base = scheme.device_base(DeviceType::Lightbulb.topic_segment(), 7);
        assert_eq!(base, "tradfri/lightbulb/7");
    }

    #[test]
    fn attribute_path_appends_key() {
        let scheme = TopicScheme::default();
        let base = scheme.device_base(DeviceType::Lightbulb.topic_segment(), 7);
        assert_eq!(attribute_path(&base, "dimmer"), "tradfri/lightbulb/7/dimmer");
    }

    #[test]
    fn unknown_type_uses_raw_token() {
        let scheme = TopicScheme::default();
        let ty = DeviceType::Unknown("customType99".to_string());
        assert_eq!(
            scheme.device_base(ty.topic_segment(), 3),
            "tradfri/customType99/3"
        );
    }

    #[test]
    fn custom_prefix() {
        let scheme = TopicScheme::new("home/ikea");
        assert_eq!(
            scheme.device_base(DeviceType::Plug.topic_segment(), 5),
            "home/ikea/plug/5"
        );
    }
}
