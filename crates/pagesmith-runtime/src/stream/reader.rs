//! Byte-oriented line reading that survives invalid UTF-8.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read the next line from `reader` into `buf`, decoding lossily.
///
/// Returns `None` on end of stream and on read errors; a vanished pipe
/// after the child died is expected here, not exceptional. The line
/// terminator is stripped, including the `\r` of CRLF output. Bytes
/// that are not valid UTF-8 come back as U+FFFD instead of aborting
/// the stream.
pub(crate) async fn next_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    match reader.read_until(b'\n', buf).await {
        Ok(0) => None,
        Ok(_) => {
            let line = String::from_utf8_lossy(buf);
            Some(line.trim_end_matches(['\n', '\r']).to_string())
        }
        Err(error) => {
            tracing::debug!(error = %error, "line read failed, treating as end of stream");
            None
        }
    }
}
