//! Packet layout shared with the Arduino firmware.
//!
//! Requests are `[address, command, flags, len, payload..., checksum]` and
//! replies are `[address, status, len, data..., checksum]`. The checksum is the
//! XOR of every preceding byte. Each packet travels COBS encoded and is
//! terminated by a single zero byte.

use crate::Error;

pub(crate) const FLAG_REPLY_REQUESTED: u8 = 0b0000_0001;

const STATUS_OK: u8 = 0;

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

pub(crate) struct EncodedRequest {
    pub(crate) cobs_encoded: Vec<u8>,
}

impl EncodedRequest {
    pub(crate) fn encode(
        address: u8,
        command: u8,
        reply_requested: bool,
        payload: &[u8],
    ) -> Result<Self, Error> {
        let Ok(len) = u8::try_from(payload.len()) else {
            return Err(Error::PayloadTooLong(payload.len()));
        };
        let flags = if reply_requested {
            FLAG_REPLY_REQUESTED
        } else {
            0
        };

        let mut packet = Vec::with_capacity(payload.len() + 5);
        packet.extend_from_slice(&[address, command, flags, len]);
        packet.extend_from_slice(payload);
        packet.push(checksum(&packet));

        let mut cobs_encoded = cobs::encode_vec(&packet);
        // Push terminal.
        cobs_encoded.push(0x00);
        Ok(Self { cobs_encoded })
    }
}

/// Validate a COBS-decoded reply and return its data bytes.
pub(crate) fn decode_response(expected_address: u8, packet: &[u8]) -> Result<Vec<u8>, Error> {
    let Some((&received_sum, body)) = packet.split_last() else {
        return Err(Error::MalformedResponse("empty frame"));
    };
    let [address, status, len, data @ ..] = body else {
        return Err(Error::MalformedResponse("truncated header"));
    };
    if data.len() != *len as usize {
        return Err(Error::MalformedResponse("length field disagrees with frame size"));
    }

    let expected = checksum(body);
    if expected != received_sum {
        return Err(Error::Checksum {
            expected,
            actual: received_sum,
        });
    }
    if *address != expected_address {
        return Err(Error::AddressMismatch {
            expected: expected_address,
            actual: *address,
        });
    }
    if *status != STATUS_OK {
        return Err(Error::DeviceStatus(*status));
    }

    Ok(data.to_vec())
}
