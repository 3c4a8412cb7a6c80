//! Editable text form of a collection
//!
//! One line per component:
//!
//! ```text
//! TileID,OffsetX,OffsetY,OffsetZ,Flag,Cliloc
//! 0x3EE1,0,0,20,0x100000001,1061999:1062004:
//! ```
//!
//! Tile id and flag are hexadecimal with an optional `0x` prefix. Offsets are
//! decimal, or hexadecimal with a `0x` prefix. References are decimal and
//! colon-terminated.

use super::collection::Collection;
use super::component::Component;
use super::error::{MultiError, MultiResult};
use std::fmt::Write;
use tracing::warn;

/// Header line written before the component lines
pub const TEXT_HEADER: &str = "TileID,OffsetX,OffsetY,OffsetZ,Flag,Cliloc";

fn strip_hex_prefix(value: &str) -> Option<&str> {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
}

fn invalid(field: &'static str, value: &str, reason: impl ToString) -> MultiError {
    MultiError::InvalidField {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_hex_u16(field: &'static str, value: &str) -> MultiResult<u16> {
    if value.is_empty() {
        return Ok(0);
    }
    let digits = strip_hex_prefix(value).unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|e| invalid(field, value, e))
}

fn parse_hex_u64(field: &'static str, value: &str) -> MultiResult<u64> {
    if value.is_empty() {
        return Ok(0);
    }
    let digits = strip_hex_prefix(value).unwrap_or(value);
    u64::from_str_radix(digits, 16).map_err(|e| invalid(field, value, e))
}

fn parse_offset(field: &'static str, value: &str) -> MultiResult<i16> {
    if value.is_empty() {
        return Ok(0);
    }
    match strip_hex_prefix(value) {
        // Hex offsets are the raw 16-bit pattern, so 0xFFFF is -1
        Some(digits) => u16::from_str_radix(digits, 16)
            .map(|raw| raw as i16)
            .map_err(|e| invalid(field, value, e)),
        None => value.parse::<i16>().map_err(|e| invalid(field, value, e)),
    }
}

fn parse_reference(value: &str) -> MultiResult<u32> {
    match strip_hex_prefix(value) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => value.parse::<u32>(),
    }
    .map_err(|e| invalid("cliloc", value, e))
}

impl Component {
    /// Parse one text line
    ///
    /// Fields are assigned left to right for as many as the line supplies;
    /// missing trailing fields keep their defaults and extra fields are
    /// ignored. A blank line yields [`Component::default`].
    pub fn parse_line(line: &str) -> MultiResult<Self> {
        let mut component = Self::default();
        let line = line.trim();
        if line.is_empty() {
            return Ok(component);
        }

        for (index, value) in line.split(',').map(str::trim).enumerate() {
            match index {
                0 => component.tile_id = parse_hex_u16("tile id", value)?,
                1 => component.offset_x = parse_offset("x offset", value)?,
                2 => component.offset_y = parse_offset("y offset", value)?,
                3 => component.offset_z = parse_offset("z offset", value)?,
                4 => component.flag = parse_hex_u64("flag", value)?,
                5 => {
                    for reference in value.split(':').map(str::trim) {
                        if !reference.is_empty() {
                            component
                                .localization_refs
                                .push(parse_reference(reference)?);
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(component)
    }

    /// Format as one text line (without line terminator)
    pub fn to_text_line(&self) -> String {
        let mut line = format!(
            "0x{:04X},{},{},{},0x{:X},",
            self.tile_id, self.offset_x, self.offset_y, self.offset_z, self.flag
        );
        for reference in &self.localization_refs {
            // Writing to String cannot fail, so we discard the result
            let _ = write!(line, "{reference}:");
        }
        line
    }
}

impl Collection {
    /// Parse the text form
    ///
    /// Blank lines, the header row and lines with nothing after the first
    /// comma are skipped. Lines that fail to parse are logged and skipped.
    pub fn from_text(text: &str) -> Self {
        let mut collection = Self::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            let Some((first, rest)) = line.split_once(',') else {
                continue;
            };
            if rest.is_empty() || first.trim().eq_ignore_ascii_case("tileid") {
                continue;
            }

            match Component::parse_line(line) {
                Ok(component) => collection.push(component),
                Err(e) => warn!("Skipping line {}: {}", number + 1, e),
            }
        }
        collection
    }

    /// Format as text, header line first
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(TEXT_HEADER.len() + 1 + self.len() * 32);
        text.push_str(TEXT_HEADER);
        text.push('\n');
        for component in self {
            text.push_str(&component.to_text_line());
            text.push('\n');
        }
        text
    }
}
