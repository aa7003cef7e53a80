//! Output sinks
//!
//! A sink is the ordered destination symbols are written to. The coordinator
//! only ever calls [`Sink::write_symbol`] while its lock is held, so a sink
//! never sees two writers at once and needs no locking of its own.

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use tracing::debug;

use crate::participant::Participant;

/// Append-only destination for emitted symbols
pub trait Sink: Send {
    /// Write one symbol on behalf of a participant
    fn write_symbol(&mut self, participant: Participant, symbol: &str) -> io::Result<()>;

    /// Flush anything still buffered once both participants are done
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for Box<dyn Sink> {
    fn write_symbol(&mut self, participant: Participant, symbol: &str) -> io::Result<()> {
        (**self).write_symbol(participant, symbol)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// How a [`WriterSink`] lays symbols out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Bare symbols back to back: `AaBbCc`
    Stream,
    /// One symbol per line
    Lines,
    /// A's symbol opens a line, B's follows after a space and closes it: `A a\nB b\n`
    Columns,
    /// One labelled line per symbol: `Odd Thread: 1`
    Labelled { a: String, b: String },
}

/// Sink over any writer, flushed after every symbol
pub struct WriterSink<W: Write> {
    writer: W,
    layout: Layout,
    line_open: bool,
}

/// Console sink
pub type ConsoleSink = WriterSink<Stdout>;

/// File sink
pub type FileSink = WriterSink<BufWriter<File>>;

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, layout: Layout) -> Self {
        Self {
            writer,
            layout,
            line_open: false,
        }
    }

    /// Consume the sink and return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<Stdout> {
    pub fn stdout(layout: Layout) -> Self {
        Self::new(io::stdout(), layout)
    }
}

impl WriterSink<BufWriter<File>> {
    /// Create (truncating) the file at `path`
    pub fn create(path: impl AsRef<Path>, layout: Layout) -> io::Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), ?layout, "WriterSink::create: opening output file");
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), layout))
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_symbol(&mut self, participant: Participant, symbol: &str) -> io::Result<()> {
        match &self.layout {
            Layout::Stream => write!(self.writer, "{}", symbol)?,
            Layout::Lines => writeln!(self.writer, "{}", symbol)?,
            Layout::Columns => match participant {
                Participant::A => {
                    if self.line_open {
                        writeln!(self.writer)?;
                    }
                    write!(self.writer, "{}", symbol)?;
                    self.line_open = true;
                }
                Participant::B => {
                    if self.line_open {
                        write!(self.writer, " ")?;
                    }
                    writeln!(self.writer, "{}", symbol)?;
                    self.line_open = false;
                }
            },
            Layout::Labelled { a, b } => {
                let label = match participant {
                    Participant::A => a,
                    Participant::B => b,
                };
                writeln!(self.writer, "{} Thread: {}", label, symbol)?;
            }
        }
        self.writer.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.writer)?;
            self.line_open = false;
        }
        self.writer.flush()
    }
}

/// Writes every symbol to two sinks, first then second
pub struct TeeSink<L, R> {
    first: L,
    second: R,
}

impl<L: Sink, R: Sink> TeeSink<L, R> {
    pub fn new(first: L, second: R) -> Self {
        Self { first, second }
    }

    pub fn into_parts(self) -> (L, R) {
        (self.first, self.second)
    }
}

impl<L: Sink, R: Sink> Sink for TeeSink<L, R> {
    fn write_symbol(&mut self, participant: Participant, symbol: &str) -> io::Result<()> {
        self.first.write_symbol(participant, symbol)?;
        self.second.write_symbol(participant, symbol)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.first.finish()?;
        self.second.finish()
    }
}

/// In-memory record of every emission, in write order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    emissions: Vec<(Participant, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> &[(Participant, String)] {
        &self.emissions
    }

    /// Symbols only, in write order
    pub fn symbols(&self) -> Vec<&str> {
        self.emissions.iter().map(|(_, s)| s.as_str()).collect()
    }

    /// Writers only, in write order
    pub fn participants(&self) -> Vec<Participant> {
        self.emissions.iter().map(|(p, _)| *p).collect()
    }

    /// All symbols concatenated
    pub fn joined(&self) -> String {
        self.emissions.iter().map(|(_, s)| s.as_str()).collect()
    }
}

impl Sink for MemorySink {
    fn write_symbol(&mut self, participant: Participant, symbol: &str) -> io::Result<()> {
        self.emissions.push((participant, symbol.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn render(layout: Layout, writes: &[(Participant, &str)]) -> String {
        let mut sink = WriterSink::new(Vec::new(), layout);
        for (p, s) in writes {
            sink.write_symbol(*p, s).unwrap();
        }
        sink.finish().unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_stream_layout() {
        let out = render(
            Layout::Stream,
            &[(Participant::A, "A"), (Participant::B, "a"), (Participant::A, "B")],
        );
        assert_eq!(out, "AaB");
    }

    #[test]
    fn test_columns_layout() {
        let out = render(
            Layout::Columns,
            &[
                (Participant::A, "A"),
                (Participant::B, "a"),
                (Participant::A, "B"),
                (Participant::B, "b"),
            ],
        );
        assert_eq!(out, "A a\nB b\n");
    }

    #[test]
    fn test_columns_layout_closes_dangling_line() {
        // A running solo after B finished
        let out = render(
            Layout::Columns,
            &[(Participant::A, "A"), (Participant::B, "a"), (Participant::A, "B"), (Participant::A, "C")],
        );
        assert_eq!(out, "A a\nB\nC\n");
    }

    #[test]
    fn test_columns_layout_solo_b_has_no_indent() {
        let out = render(
            Layout::Columns,
            &[(Participant::A, "A"), (Participant::B, "p"), (Participant::B, "q"), (Participant::B, "r")],
        );
        assert_eq!(out, "A p\nq\nr\n");
    }

    #[test]
    fn test_labelled_layout() {
        let layout = Layout::Labelled {
            a: "Odd".to_string(),
            b: "Even".to_string(),
        };
        let out = render(layout, &[(Participant::A, "1"), (Participant::B, "2")]);
        assert_eq!(out, "Odd Thread: 1\nEven Thread: 2\n");
    }

    #[test]
    fn test_file_sink_writes_through() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("output.txt");

        let mut sink = FileSink::create(&path, Layout::Stream).unwrap();
        sink.write_symbol(Participant::A, "A").unwrap();
        sink.write_symbol(Participant::B, "a").unwrap();

        // Flushed per symbol, readable before finish
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Aa");
        sink.finish().unwrap();
    }

    #[test]
    fn test_tee_sink_feeds_both() {
        let mut tee = TeeSink::new(MemorySink::new(), MemorySink::new());
        tee.write_symbol(Participant::A, "x").unwrap();
        tee.write_symbol(Participant::B, "y").unwrap();
        tee.finish().unwrap();

        let (first, second) = tee.into_parts();
        assert_eq!(first.joined(), "xy");
        assert_eq!(second.participants(), vec![Participant::A, Participant::B]);
    }
}
