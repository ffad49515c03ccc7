use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::frame::{self, EncodedRequest};
use crate::{Error, Link};

/// Upper bound on the encoded size of a single reply.
const DECODE_BUFFER_LEN: usize = 512;
const READ_CHUNK: usize = 64;

#[derive(Debug, Clone, bon::Builder)]
pub struct MasterConfig {
    #[builder(default = 115_200)]
    pub baud: u32,
    /// How long to wait for a complete reply frame. `None` waits for as
    /// long as the device takes, which includes the whole stepper move.
    pub response_timeout: Option<Duration>,
    /// Pause between reads while nothing is pending.
    #[builder(default = Duration::from_millis(2))]
    pub poll_interval: Duration,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Request/reply transport to the serial bus.
pub struct SerialMaster<L> {
    link: L,
    config: MasterConfig,
}

impl<L: Link> SerialMaster<L> {
    pub fn new(link: L, baud: u32) -> Result<Self, Error> {
        Self::with_config(link, MasterConfig::builder().baud(baud).build())
    }

    pub fn with_config(mut link: L, config: MasterConfig) -> Result<Self, Error> {
        link.set_baud_rate(config.baud)?;
        Ok(Self { link, config })
    }

    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    pub fn into_link(self) -> L {
        self.link
    }

    /// Send one command and, if `expect_reply`, wait for the device's answer.
    ///
    /// Returns the reply's data bytes, or `None` when no reply was requested.
    pub fn transact(
        &mut self,
        address: u8,
        command: u8,
        payload: &[u8],
        expect_reply: bool,
    ) -> Result<Option<Vec<u8>>, Error> {
        let request = EncodedRequest::encode(address, command, expect_reply, payload)?;
        debug!(
            "Request addr:{address} cmd:{command:#04x} w:{} reply:{expect_reply}",
            payload.len()
        );
        self.link.write_all(&request.cobs_encoded)?;

        if !expect_reply {
            return Ok(None);
        }

        let packet = self.receive_frame()?;
        let data = frame::decode_response(address, &packet)?;
        debug!("Reply addr:{address} r:{}", data.len());
        Ok(Some(data))
    }

    fn receive_frame(&mut self) -> Result<Vec<u8>, Error> {
        let deadline = self
            .config
            .response_timeout
            .map(|timeout| (Instant::now() + timeout, timeout));

        let mut decoded_bytes = [0u8; DECODE_BUFFER_LEN];
        let mut decoder = cobs::CobsDecoder::new(&mut decoded_bytes);
        let mut read_buf = [0u8; READ_CHUNK];
        let mut received = 0;
        loop {
            let bytes_read = self.link.read(&mut read_buf)?;
            if bytes_read == 0 {
                if let Some((deadline, timeout)) = deadline {
                    if Instant::now() >= deadline {
                        return Err(Error::Timeout(timeout));
                    }
                }
                thread::sleep(self.config.poll_interval);
                continue;
            }

            trace!("Link read r:{bytes_read}");
            // Decoded output is never longer than its input, so bounding the
            // input keeps the decoder inside its buffer.
            received += bytes_read;
            if received > DECODE_BUFFER_LEN {
                return Err(Error::FrameTooLong);
            }

            if let Some(report) = decoder.push(&read_buf[..bytes_read])? {
                // The frame ends at the first terminator in this chunk.
                let end = read_buf[..bytes_read]
                    .iter()
                    .position(|&b| b == 0x00)
                    .map_or(bytes_read, |i| i + 1);
                if end < bytes_read {
                    trace!("Discarding {} bytes after reply frame", bytes_read - end);
                }
                return Ok(decoded_bytes[..report.frame_size()].to_vec());
            }
        }
    }
}
