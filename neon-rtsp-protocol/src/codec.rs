use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{
    decode::decode, error::Error, request::Request, response::Response, serialize::Serialize,
};

/// Server side framing for use with `tokio_util::codec::Framed`: decodes
/// requests, encodes responses.
///
/// A malformed message is skipped before its error is returned, so the
/// buffer is already positioned at the next message if the caller wants to
/// keep going.
#[derive(Default)]
pub struct Codec;

impl Codec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Codec {
    type Item = Request;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match decode(src) {
            Ok((request, consumed)) => {
                src.advance(consumed);
                Ok(Some(request))
            }
            Err(Error::Incomplete) => Ok(None),
            Err(err) => {
                if let Some(consumed) = err.consumed() {
                    src.advance(consumed.min(src.len()));
                }
                Err(err)
            }
        }
    }
}

impl Encoder<Response> for Codec {
    type Error = Error;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.serialize(dst);
        Ok(())
    }
}
