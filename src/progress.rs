use std::io::{self, Write};

/// A single status line that is replaced on every update.
pub trait Progress {
    fn update(&mut self, line: &str) -> io::Result<()>;

    /// Mark the boundary between the write and read phases.
    fn phase_break(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Redraws the previous line in place with ANSI cursor-up and erase-line.
pub struct LineRedraw<W: Write> {
    out: W,
    drawn: bool,
}

impl<W: Write> LineRedraw<W> {
    pub fn new(out: W) -> Self {
        LineRedraw { out, drawn: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl LineRedraw<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Progress for LineRedraw<W> {
    fn update(&mut self, line: &str) -> io::Result<()> {
        if self.drawn {
            self.out.write_all(b"\x1b[F\x1b[K")?;
        }
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        self.drawn = true;
        Ok(())
    }

    fn phase_break(&mut self) -> io::Result<()> {
        writeln!(self.out, "<->")?;
        self.out.flush()
    }
}

/// Progress sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Quiet;

impl Progress for Quiet {
    fn update(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}
