use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::api::{Console, ConsoleError};

/// Console over any buffered reader and writer.
///
/// Input is a stream of whitespace-separated decimal integers, read one
/// token at a time; output is one decimal value per line, flushed after
/// every write so interleaving with prompts stays ordered.
pub struct StdConsole<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    /// Creates a console over `reader` and `writer`.
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: VecDeque::new(),
        }
    }

    /// Consumes the console, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn next_token(&mut self) -> Result<String, ConsoleError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(ConsoleError::Closed);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn read_value(&mut self) -> Result<i32, ConsoleError> {
        let token = self.next_token()?;
        token
            .parse::<i32>()
            .map_err(|_| ConsoleError::Malformed(token))
    }

    fn write_value(&mut self, value: i32) -> Result<(), ConsoleError> {
        writeln!(self.writer, "{value}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory console: queued inputs, captured outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedConsole {
    inputs: VecDeque<i32>,
    outputs: Vec<i32>,
}

impl ScriptedConsole {
    /// Creates a console that will answer `INPUT` with `inputs` in order.
    pub fn new(inputs: impl IntoIterator<Item = i32>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: Vec::new(),
        }
    }

    /// Values written by `PEEK`, in order.
    #[must_use]
    pub fn outputs(&self) -> &[i32] {
        &self.outputs
    }

    /// Inputs not yet consumed.
    #[must_use]
    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn read_value(&mut self) -> Result<i32, ConsoleError> {
        self.inputs.pop_front().ok_or(ConsoleError::Closed)
    }

    fn write_value(&mut self, value: i32) -> Result<(), ConsoleError> {
        self.outputs.push(value);
        Ok(())
    }
}
