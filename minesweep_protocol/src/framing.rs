// Newline-delimited message framing.
//
// One message per line: `write_line` appends `'\n'` and flushes so a
// response is never stuck in a buffer while the session waits for the next
// command; `read_line` reads through the next `'\n'`, tolerating a CRLF
// terminator. Messages are ASCII and small (the largest is a BOARD record,
// a few KB for the default 16x16 board), so `MAX_LINE_SIZE` caps what a
// malformed or malicious peer can make us buffer.

use std::io::{self, BufRead, Read, Write};

/// Maximum accepted line length (64 KB), excluding the terminator. Board
/// records grow with board area; 64 KB allows boards far beyond anything
/// the server will ever deal out.
pub const MAX_LINE_SIZE: usize = 64 * 1024;

/// Write one message followed by a newline, then flush.
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    if line.len() > MAX_LINE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("message too long: {} bytes (max {MAX_LINE_SIZE})", line.len()),
        ));
    }
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Read one newline-terminated message, without its terminator.
///
/// Returns `UnexpectedEof` if the stream closes before a terminator (a
/// clean close between messages reads as zero bytes, mid-message as a
/// partial line — both are the peer going away). Returns `InvalidData` if
/// the line exceeds `MAX_LINE_SIZE` before a terminator shows up.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_SIZE as u64 + 1)
        .read_line(&mut line)?;
    if read == 0 || !line.ends_with('\n') {
        if read > MAX_LINE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("message too long (max {MAX_LINE_SIZE})"),
            ));
        }
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream closed before end of message",
        ));
    }
    line.pop();
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip_simple_message() {
        let mut buf = Vec::new();
        write_line(&mut buf, "BOARD\t5,f,f,10 01 ,__ OO ").unwrap();

        let mut cursor = Cursor::new(&buf);
        assert_eq!(read_line(&mut cursor).unwrap(), "BOARD\t5,f,f,10 01 ,__ OO ");
    }

    #[test]
    fn multiple_messages_in_sequence() {
        let messages = ["NEW", "UPDATE 0,1,2", "EXIT"];
        let mut buf = Vec::new();
        for msg in &messages {
            write_line(&mut buf, msg).unwrap();
        }

        let mut cursor = Cursor::new(&buf);
        for expected in &messages {
            assert_eq!(read_line(&mut cursor).unwrap(), *expected);
        }
    }

    #[test]
    fn tolerates_crlf_terminator() {
        let mut cursor = Cursor::new(b"SCORE\r\n".to_vec());
        assert_eq!(read_line(&mut cursor).unwrap(), "SCORE");
    }

    #[test]
    fn empty_stream_is_eof() {
        let mut cursor = Cursor::new(Vec::new());
        let err = read_line(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn unterminated_line_is_eof() {
        let mut cursor = Cursor::new(b"NEW".to_vec());
        let err = read_line(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn rejects_oversized_write() {
        let big = "x".repeat(MAX_LINE_SIZE + 1);
        let mut buf = Vec::new();
        let err = write_line(&mut buf, &big).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn rejects_oversized_read() {
        let mut data = vec![b'x'; MAX_LINE_SIZE + 10];
        data.push(b'\n');
        let mut cursor = Cursor::new(data);
        let err = read_line(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
