//! Integration tests for the binary backend.

use std::io::Cursor;

use blockarchive::binary::{from_bytes, to_bytes, BinaryInputArchive, BinaryOutputArchive, ReadLimits};
use blockarchive::prelude::*;

use tempfile::NamedTempFile;

#[derive(Debug, Default, PartialEq, Clone)]
struct Everything {
    flag: bool,
    i8: i8,
    u8: u8,
    i16: i16,
    u16: u16,
    i32: i32,
    u32: u32,
    i64: i64,
    u64: u64,
    f32: f32,
    f64: f64,
    text: String,
}

impl Everything {
    fn sample() -> Self {
        Self {
            flag: true,
            i8: -8,
            u8: 200,
            i16: -1600,
            u16: 60000,
            i32: -32_000_000,
            u32: 4_000_000_000,
            i64: i64::MIN,
            u64: u64::MAX,
            f32: 0.1,
            f64: -1.0e300,
            text: "héllo wörld".to_string(),
        }
    }
}

impl Serializable for Everything {
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        let mut block = open_unordered_block(ar, name)?;
        serialize_value(&mut *block, "flag", &mut self.flag)?;
        serialize_value(&mut *block, "i8", &mut self.i8)?;
        serialize_value(&mut *block, "u8", &mut self.u8)?;
        serialize_value(&mut *block, "i16", &mut self.i16)?;
        serialize_value(&mut *block, "u16", &mut self.u16)?;
        serialize_value(&mut *block, "i32", &mut self.i32)?;
        serialize_value(&mut *block, "u32", &mut self.u32)?;
        serialize_value(&mut *block, "i64", &mut self.i64)?;
        serialize_value(&mut *block, "u64", &mut self.u64)?;
        serialize_value(&mut *block, "f32", &mut self.f32)?;
        serialize_value(&mut *block, "f64", &mut self.f64)?;
        serialize_value(&mut *block, "text", &mut self.text)
    }
}

#[test]
fn test_roundtrip_all_primitives() {
    let mut original = Everything::sample();
    let bytes = to_bytes("Everything", &mut original).expect("Failed to write");

    let mut restored = Everything::default();
    from_bytes(&bytes, "Everything", &mut restored).expect("Failed to read");
    assert_eq!(restored, original);
}

#[test]
fn test_string_wire_format() {
    struct Greeting(String);

    impl Serializable for Greeting {
        fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
            let mut block = open_sequential_block(ar, name)?;
            serialize_value(&mut *block, "text", &mut self.0)
        }
    }

    let bytes = to_bytes("Greeting", &mut Greeting("hi".into())).expect("Failed to write");
    assert_eq!(bytes, vec![2, b'h', b'i']);
}

#[test]
fn test_sequences_of_various_lengths() {
    for len in [0usize, 1, 150] {
        let mut numbers: Vec<i32> = (0..len as i32).map(|i| i * 7 - 3).collect();
        let mut words: Vec<String> = (0..len).map(|i| format!("word{}", i)).collect();

        let bytes = to_bytes("numbers", &mut numbers).expect("Failed to write numbers");
        let mut back: Vec<i32> = vec![99];
        from_bytes(&bytes, "numbers", &mut back).expect("Failed to read numbers");
        assert_eq!(back, numbers, "numbers of length {}", len);

        let bytes = to_bytes("words", &mut words).expect("Failed to write words");
        let mut back: Vec<String> = Vec::new();
        from_bytes(&bytes, "words", &mut back).expect("Failed to read words");
        assert_eq!(back, words, "words of length {}", len);
    }
}

#[test]
fn test_safe_block_isolation() {
    let mut buffer = Vec::new();
    {
        let mut ar = BinaryOutputArchive::new(&mut buffer);
        {
            let mut root = open_sequential_block(&mut ar, "Root").unwrap();
            {
                let mut first = open_safe_sequential_block(&mut *root, "First").unwrap();
                serialize_value(&mut *first, "a", &mut 1u32).unwrap();
                serialize_value(&mut *first, "extra", &mut "not read back".to_string()).unwrap();
            }
            {
                let mut second = open_safe_sequential_block(&mut *root, "Second").unwrap();
                serialize_value(&mut *second, "b", &mut 2u32).unwrap();
            }
        }
        ar.flush().unwrap();
    }

    let mut ar = BinaryInputArchive::new(Cursor::new(&buffer)).unwrap();
    let mut a = 0u32;
    let mut b = 0u32;
    {
        let mut root = open_sequential_block(&mut ar, "Root").unwrap();
        {
            // Reader knows only the first field
            let mut first = open_safe_sequential_block(&mut *root, "First").unwrap();
            serialize_value(&mut *first, "a", &mut a).unwrap();
        }
        {
            let mut second = open_safe_sequential_block(&mut *root, "Second").unwrap();
            serialize_value(&mut *second, "b", &mut b).unwrap();
        }
    }
    ar.flush().unwrap();
    assert_eq!((a, b), (1, 2));
}

#[test]
fn test_reads_are_bounded_by_safe_block() {
    let mut buffer = Vec::new();
    {
        let mut ar = BinaryOutputArchive::new(&mut buffer);
        let mut root = open_sequential_block(&mut ar, "Root").unwrap();
        {
            let mut small = open_safe_sequential_block(&mut *root, "Small").unwrap();
            serialize_value(&mut *small, "a", &mut 7u16).unwrap();
        }
        serialize_value(&mut *root, "after", &mut 0xFFFFu16).unwrap();
    }

    let mut ar = BinaryInputArchive::new(Cursor::new(&buffer)).unwrap();
    let mut root = open_sequential_block(&mut ar, "Root").unwrap();
    let mut small = open_safe_sequential_block(&mut *root, "Small").unwrap();
    // A u32 would read into the sibling that follows
    let err = serialize_value(&mut *small, "a", &mut 0u32).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert_eq!(err.block_path(), "Root/Small");
}

#[test]
fn test_file_roundtrip() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let mut original = Everything::sample();
    {
        let mut ar = BinaryOutputArchive::create(path).expect("Failed to create archive");
        original.serialize(&mut ar, "Everything").expect("Failed to write");
        ar.flush().expect("Failed to flush");
    }

    let mut ar = BinaryInputArchive::open(path).expect("Failed to open archive");
    let mut restored = Everything::default();
    restored.serialize(&mut ar, "Everything").expect("Failed to read");
    ar.flush().expect("Failed to flush");
    assert_eq!(restored, original);
    assert!(ar.is_eof());
}

#[test]
fn test_short_array_is_deferred_error() {
    let mut ar = BinaryOutputArchive::new(Vec::new());
    {
        let mut block = open_array_block(&mut ar, "items", 3).unwrap();
        serialize_value(&mut *block, "element", &mut 1u8).unwrap();
    }
    let err = ar.flush().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);
    assert_eq!(err.block_path(), "items");
}

#[test]
#[should_panic(expected = "too many items")]
fn test_long_array_panics() {
    let mut ar = BinaryOutputArchive::new(Vec::new());
    let mut block = open_array_block(&mut ar, "items", 1).unwrap();
    serialize_value(&mut *block, "element", &mut 1u8).unwrap();
    serialize_value(&mut *block, "element", &mut 2u8).unwrap();
}

#[test]
#[should_panic(expected = "outside of any block")]
fn test_element_outside_block_panics() {
    let mut ar = BinaryOutputArchive::new(Vec::new());
    let _ = serialize_value(&mut ar, "loose", &mut 1u8);
}

#[test]
fn test_second_root_is_eof() {
    let mut original = Everything::sample();
    let bytes = to_bytes("Everything", &mut original).unwrap();

    let mut ar = BinaryInputArchive::new(Cursor::new(&bytes)).unwrap();
    let mut restored = Everything::default();
    restored.serialize(&mut ar, "Everything").unwrap();
    assert!(ar.is_eof());

    let err = restored.serialize(&mut ar, "Everything").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn test_versions() {
    let mut ar = BinaryOutputArchive::new(Vec::new());
    {
        let mut block = open_unordered_block(&mut ar, "Doc").unwrap();
        let err = block.serialize_version(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);
        assert_eq!(block.serialize_version(3).unwrap(), 3);
    }
    ar.flush().unwrap();
    let bytes = ar.into_inner();
    assert_eq!(bytes, vec![3]);

    let mut ar = BinaryInputArchive::new(Cursor::new(&bytes)).unwrap();
    let mut block = open_unordered_block(&mut ar, "Doc").unwrap();
    assert_eq!(block.serialize_version(1).unwrap(), 3);
}

#[test]
fn test_string_limit() {
    let mut words = vec!["a".repeat(100)];
    let bytes = to_bytes("words", &mut words).unwrap();

    let limits = ReadLimits { max_string_len: 10, ..ReadLimits::default() };
    let mut ar = BinaryInputArchive::with_limits(Cursor::new(&bytes), limits).unwrap();
    let mut back: Vec<String> = Vec::new();
    let err = back.serialize(&mut ar, "words").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);
    assert!(back.is_empty());

    let mut ar = BinaryInputArchive::with_limits(Cursor::new(&bytes), ReadLimits::unlimited()).unwrap();
    back.serialize(&mut ar, "words").unwrap();
    assert_eq!(back, words);
}

#[test]
fn test_blob_limit() {
    let mut data = vec![7u8; 100];
    let bytes = to_bytes("data", &mut data).unwrap();

    let limits = ReadLimits { max_string_len: 10, ..ReadLimits::default() };
    let mut ar = BinaryInputArchive::with_limits(Cursor::new(&bytes), limits).unwrap();
    let mut back: Vec<u8> = vec![1];
    let err = back.serialize(&mut ar, "data").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);
    assert_eq!(err.element(), "size");
    assert_eq!(back, vec![1]);

    let mut ar = BinaryInputArchive::with_limits(Cursor::new(&bytes), ReadLimits::unlimited()).unwrap();
    back.serialize(&mut ar, "data").unwrap();
    assert_eq!(back, data);
}

#[test]
fn test_corrupt_blob_length() {
    // Largest VLE value with nothing after it
    let bytes = [0xFFu8, 0xFF, 0xFF, 0xFF];

    let mut back: Vec<f32> = Vec::new();
    let err = from_bytes(&bytes, "data", &mut back).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);

    let mut ar = BinaryInputArchive::with_limits(Cursor::new(&bytes), ReadLimits::unlimited()).unwrap();
    let err = back.serialize(&mut ar, "data").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert_eq!(err.block_path(), "data");
    assert!(back.is_empty());
}

#[test]
fn test_truncated_input() {
    let mut original = Everything::sample();
    let bytes = to_bytes("Everything", &mut original).unwrap();

    let mut restored = Everything::default();
    let err = from_bytes(&bytes[..bytes.len() - 3], "Everything", &mut restored).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert_eq!(err.element(), "text");
}
