//! Device profile parsing.
//!
//! A profile is an INI document with one `[motor.<node id>]` section per
//! drive on the bus:
//!
//! ```ini
//! [motor.5]
//! Protocol=2.0
//! PositionEncoder=1
//! RpdoIntervalUs=50000
//! HealthcheckTimeoutUs=100000
//! MinPosition=0
//! MaxPosition=1000
//! MinSpeed=-3000
//! MaxSpeed=3000
//! MinAmps=-400
//! MaxAmps=400
//! ```
//!
//! Sections with any other name are ignored, so profiles can live inside a
//! larger deployment file.

use core::str::FromStr;

use ini_core as ini;

use crate::controller::{MotorConfig, ProtocolVersion};
use crate::error::ErrorCode;
use crate::prelude::*;

fn section_failed(section: &str, more_info: String) -> ErrorCode {
    ErrorCode::ProfileSectionFailed {
        section_name: section.to_string(),
        more_info,
    }
}

/// `motor.<id>` section names carry the node id; anything else is not ours.
fn motor_section_node_id(name: &str) -> Option<&str> {
    name.strip_prefix("motor.")
}

fn require<'a>(
    properties: &'a HashMap<String, String>,
    section: &str,
    key: &str,
) -> Result<&'a str, ErrorCode> {
    properties
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| section_failed(section, format!("missing key '{}'", key)))
}

fn parse_key<V: FromStr>(
    properties: &HashMap<String, String>,
    section: &str,
    key: &str,
) -> Result<V, ErrorCode> {
    let raw = require(properties, section, key)?;
    raw.parse().map_err(|_| {
        section_failed(section, format!("invalid value '{}' for key '{}'", raw, key))
    })
}

fn build_motor_config(
    section: &str,
    id_str: &str,
    properties: &HashMap<String, String>,
) -> Result<MotorConfig, ErrorCode> {
    let node_id: u8 = id_str
        .parse()
        .ok()
        .filter(|id| *id <= 127)
        .ok_or_else(|| section_failed(section, format!("invalid node id '{}'", id_str)))?;

    let protocol_version = match require(properties, section, "Protocol")? {
        "legacy" => ProtocolVersion::Legacy,
        "2.0" => ProtocolVersion::CanOpen20,
        other => {
            return Err(section_failed(section, format!("unknown protocol '{}'", other)));
        }
    };

    let position_encoder_available = require(properties, section, "PositionEncoder")?
        .parse::<i32>()
        .unwrap_or(0)
        != 0;

    Ok(MotorConfig {
        node_id,
        protocol_version,
        position_encoder_available,
        rpdo_interval_us: parse_key(properties, section, "RpdoIntervalUs")?,
        healthcheck_timeout_us: parse_key(properties, section, "HealthcheckTimeoutUs")?,
        min_position_limit: parse_key(properties, section, "MinPosition")?,
        max_position_limit: parse_key(properties, section, "MaxPosition")?,
        min_speed_limit: parse_key(properties, section, "MinSpeed")?,
        max_speed_limit: parse_key(properties, section, "MaxSpeed")?,
        min_amps_limit: parse_key(properties, section, "MinAmps")?,
        max_amps_limit: parse_key(properties, section, "MaxAmps")?,
    })
}

/// Parses a profile document into one [`MotorConfig`] per `[motor.*]`
/// section, in document order.
pub fn load_profiles(content: &str) -> Result<Vec<MotorConfig>, ErrorCode> {
    let mut configs = Vec::new();
    let mut current_section: Option<(String, String)> = None;
    let mut current_properties: HashMap<String, String> = HashMap::new();

    for item in ini::Parser::new(content) {
        match item {
            ini::Item::Section(name) => {
                if let Some((section, id_str)) = current_section.take() {
                    configs.push(build_motor_config(&section, &id_str, &current_properties)?);
                }
                current_properties.clear();
                current_section = motor_section_node_id(name)
                    .map(|id| (String::from(name), String::from(id)));
            }
            ini::Item::Property(key, maybe_value) => {
                if current_section.is_some() {
                    let value = String::from(maybe_value.unwrap_or_default());
                    current_properties.insert(String::from(key), value);
                }
            }
            _ => {} // comments, blanks and section ends need no handling
        }
    }

    // the last section has no successor to flush it
    if let Some((section, id_str)) = current_section {
        configs.push(build_motor_config(&section, &id_str, &current_properties)?);
    }

    Ok(configs)
}
