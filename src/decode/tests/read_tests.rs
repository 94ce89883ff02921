use super::*;
use crate::codepage::KNOWN;

fn lines_of(reader: LineReader<&[u8]>) -> Vec<Vec<u8>> {
    reader.collect::<io::Result<Vec<_>>>().unwrap()
}

fn bytes(input: &[u8]) -> LineReader<&[u8]> {
    LineReader::new(input, Vec::new(), Decoder::Identity, 1, Endian::Little)
}

fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

#[test]
fn test_lines_keep_terminators() {
    let lines = lines_of(bytes(b"1\r\n00:00:01,000 --> 00:00:02,000\r\n\r\n"));
    assert_eq!(
        lines,
        vec![
            b"1\r\n".to_vec(),
            b"00:00:01,000 --> 00:00:02,000\r\n".to_vec(),
            b"\r\n".to_vec()
        ]
    );
}

#[test]
fn test_last_line_without_terminator() {
    let mut reader = bytes(b"a\nb");
    assert_eq!(reader.next().unwrap().unwrap(), b"a\n");
    assert_eq!(reader.next().unwrap().unwrap(), b"b");
    assert!(reader.next().is_none());
    assert_eq!(reader.line_count(), 2);
}

#[test]
fn test_empty_input() {
    let mut reader = bytes(b"");
    assert!(reader.next().is_none());
    assert_eq!(reader.line_count(), 0);
}

#[test]
fn test_overflow_read_first() {
    let reader = LineReader::new(&b"\r\nsecond\n"[..], b"1".to_vec(), Decoder::Identity, 1, Endian::Little);
    assert_eq!(lines_of(reader), vec![b"1\r\n".to_vec(), b"second\n".to_vec()]);
}

#[test]
fn test_line_across_small_buffers() {
    let input = b"00:02:17,440 --> 00:02:20,375\nnext\n";
    let buffered = io::BufReader::with_capacity(3, &input[..]);
    let reader = LineReader::new(buffered, Vec::new(), Decoder::Identity, 1, Endian::Little);

    let lines: Vec<Vec<u8>> = reader.collect::<io::Result<_>>().unwrap();
    assert_eq!(
        lines,
        vec![b"00:02:17,440 --> 00:02:20,375\n".to_vec(), b"next\n".to_vec()]
    );
}

#[test]
fn test_overlong_line_truncated() {
    let mut input = vec![b'x'; MAX_LINE + 100];
    input.extend_from_slice(b"\nshort\n");

    let lines = lines_of(bytes(&input));
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), MAX_LINE);
    assert_eq!(lines[0].last(), Some(&b'\n'));
    assert_eq!(lines[1], b"short\n");
}

#[test]
fn test_overlong_last_line_without_terminator() {
    let input = vec![b'y'; MAX_LINE * 2];
    let lines = lines_of(bytes(&input));
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].len(), MAX_LINE - 1);
}

#[test]
fn test_utf16le_lines() {
    let input = utf16le("1\r\n00:00:01,000 --> 00:00:02,000\r\nÀ bientôt\r\n");
    let decoder = Decoder::for_codepage(&KNOWN[2]).unwrap();
    let reader = LineReader::new(&input[..], Vec::new(), decoder, 2, Endian::Little);

    assert_eq!(
        lines_of(reader),
        vec![
            b"1\r\n".to_vec(),
            b"00:00:01,000 --> 00:00:02,000\r\n".to_vec(),
            "À bientôt\r\n".as_bytes().to_vec()
        ]
    );
}

#[test]
fn test_utf16_lone_newline_byte_is_not_a_terminator() {
    // U+0A0D is one character whose low byte is 0x0A
    let input = b"\x0D\x0Aa\x00\n\x00";
    let reader = LineReader::new(&input[..], Vec::new(), Decoder::Identity, 2, Endian::Little);
    assert_eq!(lines_of(reader), vec![input.to_vec()]);
}

#[test]
fn test_utf16_overflow_byte_completes_first_unit() {
    // detection kept the first content byte
    let decoder = Decoder::for_codepage(&KNOWN[2]).unwrap();
    let reader = LineReader::new(&b"\x00\n\x00"[..], b"A".to_vec(), decoder, 2, Endian::Little);
    assert_eq!(lines_of(reader), vec![b"A\n".to_vec()]);
}

#[test]
fn test_utf32be_lines() {
    let input = b"\x00\x00\x00\x31\x00\x00\x00\n\x00\x00\x00\x32";
    let decoder = Decoder::for_codepage(&KNOWN[3]).unwrap();
    let reader = LineReader::new(&input[..], Vec::new(), decoder, 4, Endian::Big);
    assert_eq!(lines_of(reader), vec![b"1\n".to_vec(), b"2".to_vec()]);
}

#[test]
fn test_partial_trailing_unit_dropped() {
    let input = b"a\x00\n\x00b\x00c";
    let reader = LineReader::new(&input[..], Vec::new(), Decoder::Identity, 2, Endian::Little);
    assert_eq!(lines_of(reader), vec![b"a\x00\n\x00".to_vec(), b"b\x00".to_vec()]);

    let reader = LineReader::new(&b"z"[..], Vec::new(), Decoder::Identity, 2, Endian::Little);
    assert!(lines_of(reader).is_empty());
}

#[test]
fn test_overlong_wide_line_keeps_terminator() {
    let mut input = utf16le(&"w".repeat(MAX_LINE));
    input.extend_from_slice(&utf16le("\n"));

    let reader = LineReader::new(&input[..], Vec::new(), Decoder::Identity, 2, Endian::Little);
    let lines = lines_of(reader);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].len(), MAX_LINE);
    assert!(lines[0].ends_with(b"\n\x00"));
}

#[test]
fn test_unterminated_last_line_flushes_decoder() {
    let decoder = Decoder::for_codepage(&KNOWN[2]).unwrap();
    let reader = LineReader::new(&b"1\x00\n\x00a\x00\x3D\xD8"[..], Vec::new(), decoder, 2, Endian::Little);
    assert_eq!(
        lines_of(reader),
        vec![b"1\n".to_vec(), "a\u{FFFD}".as_bytes().to_vec()]
    );

    let decoder = Decoder::for_codepage(&KNOWN[8]).unwrap();
    let reader = LineReader::new(&b"ok\nx\x81"[..], Vec::new(), decoder, 1, Endian::Little);
    assert_eq!(
        lines_of(reader),
        vec![b"ok\n".to_vec(), "x\u{FFFD}".as_bytes().to_vec()]
    );
}
