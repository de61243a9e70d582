//! Capture mode: tee stdin into an append pipeline.
//!
//! Every input line is echoed to stdout and queued as a record with a
//! fixed tag and level. On EOF or a termination signal the pipeline is
//! stopped, which writes out whatever is still queued.

use crate::signal::Shutdown;
use anyhow::Result;
use logkit::level::Level;
use logkit::pipeline::AppendPipeline;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// How often the loop checks for a shutdown request while stdin is idle
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub tag: String,
    pub level: Level,
}

/// Copy `input` into the pipeline (and to `echo`) until EOF or shutdown.
///
/// Returns the number of lines captured.
pub fn run_capture<R, W>(
    input: R,
    mut echo: W,
    pipeline: &mut AppendPipeline,
    options: &CaptureOptions,
    shutdown: &Shutdown,
) -> Result<u64>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    pipeline.start()?;
    let producer = pipeline.handle();

    // Blocking reads happen on their own thread so signals are noticed
    let (tx, rx) = channel::<io::Result<String>>();
    thread::Builder::new()
        .name("logkit-stdin".into())
        .spawn(move || {
            let mut input = input;
            let mut buf = Vec::new();
            loop {
                let line = read_line_lossy(&mut input, &mut buf).transpose();
                let Some(line) = line else {
                    break;
                };
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })?;

    let mut captured = 0u64;
    while !shutdown.is_requested() {
        match rx.recv_timeout(SHUTDOWN_POLL) {
            Ok(Ok(line)) => {
                // stdout may be closed; the file is what matters
                let _ = writeln!(echo, "{}", line);
                producer.log(options.level, &options.tag, &line);
                captured += 1;
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "stopped reading input");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    let _ = echo.flush();

    pipeline.stop();
    tracing::debug!(captured, path = %pipeline.path().display(), "capture finished");
    Ok(captured)
}

/// Next line without its `\n` / `\r\n`, invalid UTF-8 replaced.
/// `None` at EOF.
fn read_line_lossy<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    loop {
        match input.read_until(b'\n', buf) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}
