//! Property tests for the codec primitives

use dxfdom::io::dxf::writer::format_double;
use dxfdom::types::Handle;
use dxfdom::xdata::{chunk_bytes, XDataRecord, XDataValue};
use proptest::prelude::*;

proptest! {
    /// The ASCII double spelling must be stable under reparse, otherwise
    /// save/load/save cannot be byte-identical.
    #[test]
    fn format_double_is_reparse_stable(value in -1e12f64..1e12f64) {
        let first = format_double(value);
        let reparsed: f64 = first.parse().unwrap();
        let second = format_double(reparsed);
        prop_assert_eq!(first, second);
    }

    /// Handles round trip through their hex wire form.
    #[test]
    fn handle_hex_roundtrip(value in 1u64..u64::MAX) {
        let handle = Handle::new(value);
        prop_assert_eq!(Handle::from_hex(&handle.to_hex()), Some(handle));
    }

    /// Chunking splits at the wire limit and loses nothing; pushing the
    /// chunks back into a record coalesces them to the original bytes.
    #[test]
    fn byte_chunks_rejoin(data in proptest::collection::vec(any::<u8>(), 0..600)) {
        let chunks: Vec<&[u8]> = chunk_bytes(&data).collect();
        for chunk in &chunks {
            prop_assert!(chunk.len() <= 127);
        }

        let mut record = XDataRecord::new("APP");
        for chunk in chunks {
            record.push(XDataValue::Bytes(chunk.to_vec()));
        }
        if data.is_empty() {
            prop_assert!(record.is_empty());
        } else {
            prop_assert_eq!(record.len(), 1);
            prop_assert_eq!(&record.values[0], &XDataValue::Bytes(data));
        }
    }
}
