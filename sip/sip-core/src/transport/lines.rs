use super::Transport;
use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

const MAX_LINE_LEN: usize = u16::MAX as usize;

/// Splits received bytes into lines, stripping `\r\n` or `\n`
#[derive(Debug, Default)]
pub struct LineDecoder {
    // bytes of `src` already searched for a newline
    progress: usize,
}

impl Decoder for LineDecoder {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        let Some(pos) = src[self.progress..].iter().position(|&b| b == b'\n') else {
            self.progress = src.len();

            if src.len() > MAX_LINE_LEN {
                src.clear();
                self.progress = 0;

                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "received line too long",
                ));
            }

            return Ok(None);
        };

        let end = self.progress + pos;
        self.progress = 0;

        let line = src.split_to(end);
        src.advance(1);

        Ok(Some(into_line(&line)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        self.progress = 0;

        if src.is_empty() {
            Ok(None)
        } else {
            let line = src.split();
            Ok(Some(into_line(&line)))
        }
    }
}

fn into_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

    String::from_utf8_lossy(bytes).into_owned()
}

/// Reads lines from a transport
pub struct LineReader<'t> {
    transport: &'t mut dyn Transport,
    decoder: LineDecoder,
    buffer: BytesMut,
    eof: bool,
}

impl<'t> LineReader<'t> {
    pub fn new(transport: &'t mut dyn Transport) -> Self {
        Self {
            transport,
            decoder: LineDecoder::default(),
            buffer: BytesMut::with_capacity(4096),
            eof: false,
        }
    }

    /// Returns the next line or `None` once the peer closed the connection
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if self.eof {
                return self.decoder.decode_eof(&mut self.buffer);
            }

            if let Some(line) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(line));
            }

            if self.transport.recv(&mut self.buffer).await? == 0 {
                log::trace!("{} closed by peer", self.transport);
                self.eof = true;
            }
        }
    }
}
