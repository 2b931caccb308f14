use std::time::{Duration, Instant};

use anyhow::Result;
use flowcalc_core::{Event, FilterChain};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::warn;

#[derive(Debug, Default)]
pub struct RunReport {
    pub lines: u64,
    pub emitted: u64,
    pub skipped: u64,
    pub elapsed: Duration,
}

fn decode(line: &[u8]) -> Result<Event> {
    Event::from_value(serde_json::from_slice(line)?)
}

fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }
    line
}

/// Streams NDJSON events from `input` through `chain` into `output`.
///
/// Whatever was already written is flushed even when reading or writing fails
/// part way through.
pub async fn run<R, W>(input: R, output: W, chain: &FilterChain) -> Result<RunReport>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let started = Instant::now();
    let mut writer = BufWriter::new(output);
    let mut report = RunReport::default();

    let pumped = pump(BufReader::new(input), &mut writer, chain, &mut report).await;
    let flushed = writer.flush().await;
    pumped?;
    flushed?;

    report.elapsed = started.elapsed();
    Ok(report)
}

async fn pump<R, W>(
    mut reader: BufReader<R>,
    writer: &mut BufWriter<W>,
    chain: &FilterChain,
    report: &mut RunReport,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        report.lines += 1;

        let line = trim_line_end(&buf);
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let event = match decode(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = report.lines, error = %e, "Skipping malformed event");
                report.skipped += 1;
                continue;
            }
        };

        for out in chain.process(event) {
            let mut encoded = serde_json::to_vec(&out)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            report.emitted += 1;
        }
    }
}
