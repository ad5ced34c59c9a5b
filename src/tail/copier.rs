use super::buffer::TailBuffer;
use super::progress::ProgressMeter;
use super::types::{CopyOptions, CopyOutcome, CopySummary};
use crate::error::TeetailError;
use crate::utils::reserve_bytes;
use std::io::{ErrorKind, Read, Write};
use std::time::Instant;

/// Pumps an input stream into a [`TailBuffer`], echoing each block.
pub struct StreamCopier<'a> {
    options: &'a CopyOptions,
    block: Vec<u8>,
}

impl<'a> StreamCopier<'a> {
    /// The read block is capped at the tail capacity.
    pub fn new(options: &'a CopyOptions, capacity: usize) -> Result<Self, TeetailError> {
        let size = options.block_size.min(capacity).max(1);
        let mut block = reserve_bytes(size)?;
        block.resize(size, 0);
        Ok(Self { options, block })
    }

    /// Copies `input` until end of stream or a failure. `echo` is only written
    /// to when echoing is enabled; progress lines go to `status`.
    pub fn run<R, W, S>(
        &mut self,
        mut input: R,
        mut echo: W,
        mut status: S,
        tail: &mut TailBuffer,
    ) -> CopySummary
    where
        R: Read,
        W: Write,
        S: Write,
    {
        let mut meter = self.options.progress.then(|| ProgressMeter::new(Instant::now()));
        if meter.is_some() && self.options.echo {
            write_status(&mut status, b"\n");
        }

        let outcome = loop {
            let want = self.block.len().min(tail.room_before_wrap());
            let n = match input.read(&mut self.block[..want]) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break CopyOutcome::InputFailed(e),
            };
            let block = &self.block[..n];

            tail.append(block);

            if let Some(meter) = meter.as_mut() {
                if let Some(line) = meter.tick(Instant::now(), tail.total_written()) {
                    write_status(&mut status, line.as_bytes());
                }
            }

            if self.options.echo {
                if let Err(e) = echo.write_all(block).and_then(|_| echo.flush()) {
                    break CopyOutcome::EchoFailed(e);
                }
            }

            if n == 0 {
                break CopyOutcome::Completed;
            }
        };

        if meter.as_ref().is_some_and(ProgressMeter::has_reported) {
            write_status(&mut status, b"\n");
        }

        tracing::debug!(
            total_bytes = tail.total_written(),
            ?outcome,
            "copy loop finished"
        );

        CopySummary {
            total_bytes: tail.total_written(),
            outcome,
        }
    }
}

/// Progress output is best effort; a failing status channel never stops the copy.
fn write_status<S: Write>(status: &mut S, bytes: &[u8]) {
    if let Err(e) = status.write_all(bytes).and_then(|_| status.flush()) {
        tracing::debug!("failed to write progress status: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Accepts `limit` bytes, then fails every write.
    struct BrokenPipe {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() >= self.limit {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "pipe closed"));
            }
            let n = buf.len().min(self.limit - self.written.len());
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Yields its data a few bytes at a time, interrupted before every read.
    struct Trickle {
        data: Cursor<Vec<u8>>,
        interrupt_next: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt_next = !self.interrupt_next;
            if self.interrupt_next {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let len = buf.len().min(3);
            self.data.read(&mut buf[..len])
        }
    }

    struct FailingInput;

    impl Read for FailingInput {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "device gone"))
        }
    }

    fn options(block_size: usize, echo: bool) -> CopyOptions {
        CopyOptions {
            block_size,
            echo,
            progress: false,
        }
    }

    #[test]
    fn echoes_everything_and_keeps_tail() {
        let options = options(4, true);
        let mut tail = TailBuffer::new(6).unwrap();
        let mut out = Vec::new();
        let mut status = Vec::new();

        let summary = StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(&b"the quick brown fox"[..], &mut out, &mut status, &mut tail);

        assert!(matches!(summary.outcome, CopyOutcome::Completed));
        assert_eq!(summary.total_bytes, 19);
        assert_eq!(out, b"the quick brown fox");
        assert_eq!(tail.linearize(), b"wn fox");
        assert!(status.is_empty());
    }

    #[test]
    fn quiet_writes_nothing() {
        let options = options(1024, false);
        let mut tail = TailBuffer::new(4).unwrap();
        let mut out = Vec::new();

        let summary = StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(&b"ABCDEFG"[..], &mut out, io::sink(), &mut tail);

        assert!(matches!(summary.outcome, CopyOutcome::Completed));
        assert!(out.is_empty());
        assert_eq!(tail.linearize(), b"DEFG");
    }

    #[test]
    fn empty_input() {
        let options = CopyOptions::default();
        let mut tail = TailBuffer::new(16).unwrap();
        let mut out = Vec::new();

        let summary = StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(io::empty(), &mut out, io::sink(), &mut tail);

        assert!(matches!(summary.outcome, CopyOutcome::Completed));
        assert_eq!(summary.total_bytes, 0);
        assert!(out.is_empty());
        assert!(tail.linearize().is_empty());
    }

    #[test]
    fn short_and_interrupted_reads() {
        let data: Vec<u8> = (0..100).collect();
        let input = Trickle {
            data: Cursor::new(data.clone()),
            interrupt_next: false,
        };
        let options = options(16, true);
        let mut tail = TailBuffer::new(10).unwrap();
        let mut out = Vec::new();

        let summary = StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(input, &mut out, io::sink(), &mut tail);

        assert!(matches!(summary.outcome, CopyOutcome::Completed));
        assert_eq!(out, data);
        assert_eq!(tail.linearize(), &data[90..]);
    }

    #[test]
    fn echo_failure_stops_copy_but_keeps_tail() {
        let options = options(2, true);
        let mut tail = TailBuffer::new(3).unwrap();
        let mut out = BrokenPipe {
            written: Vec::new(),
            limit: 5,
        };

        let summary = StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(&b"0123456789"[..], &mut out, io::sink(), &mut tail);

        assert!(matches!(
            summary.outcome,
            CopyOutcome::EchoFailed(ref e) if e.kind() == ErrorKind::BrokenPipe
        ));
        assert_eq!(out.written, b"01234");
        assert_eq!(summary.total_bytes, 6);
        assert_eq!(tail.linearize(), b"345");
    }

    #[test]
    fn input_failure_is_reported() {
        let options = CopyOptions::default();
        let mut tail = TailBuffer::new(8).unwrap();

        let summary = StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(FailingInput, io::sink(), io::sink(), &mut tail);

        assert!(matches!(summary.outcome, CopyOutcome::InputFailed(_)));
        assert_eq!(summary.total_bytes, 0);
    }

    #[test]
    fn failing_status_channel_does_not_stop_copy() {
        let options = CopyOptions {
            block_size: 4,
            echo: true,
            progress: true,
        };
        let mut tail = TailBuffer::new(5).unwrap();
        let mut out = Vec::new();
        let status = BrokenPipe {
            written: Vec::new(),
            limit: 0,
        };

        let summary = StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(&b"status is gone"[..], &mut out, status, &mut tail);

        assert!(matches!(summary.outcome, CopyOutcome::Completed));
        assert_eq!(out, b"status is gone");
        assert_eq!(tail.linearize(), b" gone");
    }

    #[test]
    fn progress_opens_status_line_when_echoing() {
        let options = CopyOptions {
            block_size: 8,
            echo: true,
            progress: true,
        };
        let mut tail = TailBuffer::new(8).unwrap();
        let mut out = Vec::new();
        let mut status = Vec::new();

        StreamCopier::new(&options, tail.capacity())
            .unwrap()
            .run(&b"abc"[..], &mut out, &mut status, &mut tail);

        assert_eq!(out, b"abc");
        assert!(status.starts_with(b"\n"));
    }
}
