use std::borrow::Cow;

use log::warn;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::process::{Console, OutputStream};

/// Maximum size of a single chunk read from a child stream.
const CHUNK_SIZE: usize = 8 * 1024;

/// Prefixes a chunk of child output with `"<runtime>: "` when it ends with a newline.
///
/// A chunk not ending with a newline (a prompt, a partial line) is returned untouched. The prefix is
/// added once, at the chunk start, whatever the number of lines in the chunk.
///
/// # Example
/// ```
/// use espruino_runner::process::prefix_chunk;
///
/// assert_eq!(prefix_chunk("espruino", b"Hello world\n").as_ref(), b"espruino: Hello world\n");
/// assert_eq!(prefix_chunk("espruino", b"2 + 2").as_ref(), b"2 + 2");
/// ```
pub fn prefix_chunk<'a>(runtime: &str, chunk: &'a [u8]) -> Cow<'a, [u8]> {
    if !chunk.ends_with(b"\n") {
        return Cow::Borrowed(chunk);
    }
    let mut prefixed = Vec::with_capacity(runtime.len() + 2 + chunk.len());
    prefixed.extend_from_slice(runtime.as_bytes());
    prefixed.extend_from_slice(b": ");
    prefixed.extend_from_slice(chunk);
    Cow::Owned(prefixed)
}

/// Relays a child stream to the console, chunk by chunk, until the end of the stream.
///
/// Console write failures are logged and skipped: the child stream is always drained.
///
/// # Errors
/// A read failure on the child stream.
pub async fn relay_output<R: AsyncRead + Unpin>(
    mut reader: R,
    runtime: &str,
    stream: OutputStream,
    console: &dyn Console,
) -> std::io::Result<()> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            return Ok(());
        }
        let chunk = prefix_chunk(runtime, &buffer[..read]);
        if let Err(err) = console.write(stream, &chunk) {
            warn!("Could not relay {} chunk: {}", stream, err);
        }
    }
}
