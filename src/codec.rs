//! Pairs a decoder for the source codepage with an encoder for the output
//! codepage.
use tracing::{debug, warn};

use crate::codepage::{CodepageTable, UTF_8};
use crate::decode::Decoder;
use crate::encode::Encoder;

/// The decoder and encoder chosen for one stream, plus the BOM to write in
/// front of the output.
#[derive(Debug)]
pub struct CodecBridge {
    pub decoder: Decoder,
    pub encoder: Encoder,
    pub bom: &'static [u8],
    /// Set when transcoding was asked for but could not be set up, and raw
    /// bytes are passed through instead.
    pub degraded: bool,
}

impl CodecBridge {
    fn passthrough(degraded: bool) -> Self {
        CodecBridge {
            decoder: Decoder::Identity,
            encoder: Encoder::Identity,
            bom: b"",
            degraded,
        }
    }

    /// Sets up transcoding from `source` to `destination`, both indices into
    /// `table`.
    ///
    /// * Without a source codepage bytes pass through untouched.
    /// * A single byte source that is also the destination passes through
    ///   too. Wider codepages are always decoded so the retiming engine sees
    ///   ASCII, and encoded again on the way out.
    /// * If either side has no converter the bridge degrades to passthrough
    ///   and says so in [`CodecBridge::degraded`].
    ///
    /// Unless degraded or passing through an unknown source, a destination
    /// other than UTF-8 and the user-defined slot gets its BOM written.
    pub fn open(table: &CodepageTable, source: Option<usize>, destination: usize) -> CodecBridge {
        let Some(src) = source.and_then(|index| table.get(index)) else {
            debug!("no source codepage, passing bytes through");
            return CodecBridge::passthrough(false);
        };
        let Some(dst) = table.get(destination) else {
            warn!("unknown output codepage {destination}, passing bytes through");
            return CodecBridge::passthrough(true);
        };

        let bom = if destination == UTF_8 { b"" as &[u8] } else { dst.signature };

        if source == Some(destination) && src.width == 1 {
            debug!("source and output are both {}, passing bytes through", src.name);
            return CodecBridge {
                bom,
                ..CodecBridge::passthrough(false)
            };
        }

        match (Decoder::for_codepage(src), Encoder::for_codepage(dst)) {
            (Some(decoder), Some(encoder)) => {
                debug!("transcoding {} to {}", src.name, dst.name);
                CodecBridge {
                    decoder,
                    encoder,
                    bom,
                    degraded: false,
                }
            }
            _ => {
                warn!(
                    "cannot transcode {} to {}, passing bytes through",
                    src.name, dst.name
                );
                CodecBridge::passthrough(true)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
