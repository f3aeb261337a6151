use infomap_core::SlideResolver;
use std::io::{self, BufRead, Write};

/// Asks on a terminal for the slide number of each unmatched asset.
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
}

impl TerminalResolver<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, filename: &str) -> io::Result<Option<u32>> {
        loop {
            write!(self.output, "Enter slide number for {}: ", filename)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match line.trim().parse::<u32>() {
                Ok(slide) => return Ok(Some(slide)),
                Err(_) => writeln!(self.output, "Please enter a valid integer.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> SlideResolver for TerminalResolver<R, W> {
    fn resolve_missing_id(&mut self, filename: &str) -> Option<u32> {
        self.ask(filename).unwrap_or_else(|e| {
            tracing::error!(error = %e, "terminal input failed");
            None
        })
    }
}
