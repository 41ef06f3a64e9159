//! Input filtering.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct IngestConfig {
    /// Records are kept only when one endpoint uses one of these ports.
    #[serde(default = "default_mqtt_ports")]
    #[validate(length(min = 1))]
    #[validate(custom(function = validation::validate_ports))]
    pub mqtt_ports: Vec<u16>,

    /// Split each TCP payload into MQTT PDUs before decoding.
    #[serde(default)]
    pub split_pdus: bool,

    /// Longest PDU the splitter will wait for; a longer announced length is
    /// treated as corrupt and the stream resynchronises after its header.
    #[serde(default = "default_max_pdu_bytes")]
    #[validate(range(min = 2, max = 268435460))]
    pub max_pdu_bytes: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            mqtt_ports: default_mqtt_ports(),
            split_pdus: false,
            max_pdu_bytes: default_max_pdu_bytes(),
        }
    }
}

fn default_mqtt_ports() -> Vec<u16> {
    vec![1883, 8883]
}

fn default_max_pdu_bytes() -> u32 {
    16_384
}
