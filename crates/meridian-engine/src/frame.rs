//! Binary command framing for the framed-TCP payload adapter family.
//!
//! On-wire layout: byte 0 = 0xAA magic, byte 1 = opcode, bytes 2–3 =
//! big-endian payload byte length, bytes 4–7 reserved, then the payload
//! as big-endian IEEE-754 float64 values (3 for a move, 8 for a full
//! pose including quaternion).

use meridian_core::error::{GuidanceError, Result};
use meridian_core::types::Vector3;

/// Frame magic byte.
pub const FRAME_MAGIC: u8 = 0xAA;

/// Header length in bytes.
pub const HEADER_LEN: usize = 8;

/// Command opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    MotorEnable = 0x01,
    TelemetryRequest = 0x02,
    Move = 0x03,
    Stop = 0x04,
    JointCommand = 0x05,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            0x01 => Some(Opcode::MotorEnable),
            0x02 => Some(Opcode::TelemetryRequest),
            0x03 => Some(Opcode::Move),
            0x04 => Some(Opcode::Stop),
            0x05 => Some(Opcode::JointCommand),
            _ => None,
        }
    }
}

/// Encode a frame with float64 payload values.
pub fn encode(opcode: Opcode, values: &[f64]) -> Vec<u8> {
    let payload_len = values.len() * 8;
    let mut frame = Vec::with_capacity(HEADER_LEN + payload_len);
    frame.push(FRAME_MAGIC);
    frame.push(opcode as u8);
    frame.extend_from_slice(&(payload_len as u16).to_be_bytes());
    frame.extend_from_slice(&[0u8; 4]); // reserved
    for v in values {
        frame.extend_from_slice(&v.to_be_bytes());
    }
    frame
}

/// Encode a move command carrying a target position.
pub fn encode_move(target: &Vector3) -> Vec<u8> {
    encode(Opcode::Move, &[target.x, target.y, target.z])
}

/// Decode a frame back into opcode and float64 payload.
pub fn decode(frame: &[u8]) -> Result<(Opcode, Vec<f64>)> {
    if frame.len() < HEADER_LEN {
        return Err(dispatch_error("frame shorter than header"));
    }
    if frame[0] != FRAME_MAGIC {
        return Err(dispatch_error("bad magic byte"));
    }
    let opcode = Opcode::from_byte(frame[1]).ok_or_else(|| dispatch_error("unknown opcode"))?;
    let payload_len = u16::from_be_bytes([frame[2], frame[3]]) as usize;
    if frame.len() != HEADER_LEN + payload_len || payload_len % 8 != 0 {
        return Err(dispatch_error("payload length mismatch"));
    }

    let mut values = Vec::with_capacity(payload_len / 8);
    for chunk in frame[HEADER_LEN..].chunks_exact(8) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        values.push(f64::from_be_bytes(bytes));
    }
    Ok((opcode, values))
}

fn dispatch_error(detail: &str) -> GuidanceError {
    GuidanceError::DispatchFailed {
        attempts: 1,
        detail: detail.to_string(),
    }
}
