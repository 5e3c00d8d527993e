use bytes::BytesMut;

/// Write a message in wire form to the end of `dst`.
pub trait Serialize {
    fn serialize(&self, dst: &mut BytesMut);
}
