//! Diagnostic log capture

use futures::io::{AsyncRead, AsyncWrite};
use std::io::Write;
use tracing::debug;

use super::error::{FrameworkError, Result};
use crate::k8s::Platform;

/// Number of trailing log lines captured at teardown
pub const DEFAULT_TAIL_LINES: i64 = 50;

/// Read the last `tail_lines` lines of `workload`'s log into memory
pub async fn collect_logs<P: Platform + ?Sized>(
    platform: &P,
    namespace: &str,
    workload: &str,
    tail_lines: i64,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    platform
        .copy_logs(namespace, workload, tail_lines, &mut buf)
        .await?;

    debug!("Collected {} bytes of {} logs", buf.len(), workload);
    Ok(buf)
}

/// Copy an opened log stream into `out` until EOF
///
/// Takes the stream by value so it is closed on every return path.
pub async fn copy_stream<R, W>(reader: R, out: &mut W, workload: &str) -> Result<u64>
where
    R: AsyncRead,
    W: AsyncWrite + Unpin + ?Sized,
{
    futures::io::copy(reader, out)
        .await
        .map_err(|source| FrameworkError::LogRead {
            workload: workload.to_string(),
            source,
        })
}

/// Write collected logs under a banner line
pub fn write_report<W: Write>(out: &mut W, workload: &str, logs: &[u8]) -> Result<()> {
    writeln!(out, "{workload} logs ===").map_err(FrameworkError::Report)?;
    out.write_all(logs).map_err(FrameworkError::Report)?;
    if !logs.ends_with(b"\n") {
        writeln!(out).map_err(FrameworkError::Report)?;
    }
    out.flush().map_err(FrameworkError::Report)
}
