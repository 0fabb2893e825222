use std::hash::Hash;

/// Fixed-width little-endian byte encoding for the integer types that appear
/// as row keys and columns in exported results.
pub trait ByteEncodable: Sized {
    /// Encodes the value into a freshly allocated byte vector.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decodes a value from the front of `bytes`.
    ///
    /// # Returns
    /// `None` if `bytes` is shorter than [`ByteEncodable::byte_size`].
    fn from_bytes(bytes: &[u8]) -> Option<Self>;

    /// Width of the encoded representation in bytes.
    fn byte_size() -> usize;
}

macro_rules! impl_byte_encodable {
    ($($ty:ty),*) => {
        $(
            impl ByteEncodable for $ty {
                fn to_bytes(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }

                fn from_bytes(bytes: &[u8]) -> Option<Self> {
                    let width = <$ty as ByteEncodable>::byte_size();
                    let array = bytes.get(0..width)?.try_into().ok()?;
                    Some(<$ty>::from_le_bytes(array))
                }

                fn byte_size() -> usize {
                    std::mem::size_of::<$ty>()
                }
            }
        )*
    };
}

impl_byte_encodable!(u32, u64);

/// Types usable as vertex identifiers: totally ordered, hashable and encodable as a row key.
pub trait VertexId: ByteEncodable + Copy + Ord + Eq + Hash + Send + Sync {}

impl<T> VertexId for T where T: ByteEncodable + Copy + Ord + Eq + Hash + Send + Sync {}

#[cfg(test)]
mod test_graph_serialize {
    use crate::types::graph_serialize::ByteEncodable;

    #[test]
    fn test_u64_layout() {
        let bytes = 0x0102_0304_0506_0708u64.to_bytes();
        assert_eq!(bytes, vec![8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(u64::byte_size(), 8);
    }

    #[test]
    fn test_decode_reads_prefix_only() {
        let mut bytes = 42u32.to_bytes();
        bytes.extend_from_slice(&[0xff, 0xff]);
        assert_eq!(u32::from_bytes(&bytes), Some(42));
    }

    #[test]
    fn test_short_input() {
        assert_eq!(u64::from_bytes(&[1, 2, 3]), None);
        assert_eq!(u32::from_bytes(&[]), None);
    }
}
