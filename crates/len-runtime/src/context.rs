//! Input and output seen by a running program.

use len_core::{InputMode, Result};
use std::io::{BufRead, Write};

/// Prompt the generated program prints before every read
pub const INPUT_PROMPT: &str = "Input:\n";

/// I/O channels for one execution
pub struct ExecutionContext<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
    input_mode: InputMode,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write, input_mode: InputMode) -> Self {
        Self {
            input,
            output,
            input_mode,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Prompt, read one token or line, and return the code of its first
    /// byte; zero when input is exhausted or the read is empty
    pub fn read_char_code(&mut self) -> Result<i32> {
        self.output.write_all(INPUT_PROMPT.as_bytes())?;
        self.output.flush()?;

        let read = match self.input_mode {
            InputMode::Token => self.read_token()?,
            InputMode::Line => self.read_line()?,
        };
        Ok(read.first().map_or(0, |byte| i32::from(*byte)))
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        write!(self.output, "{}", value)?;
        Ok(())
    }

    /// Write the low eight bits of `value` as one byte
    pub fn write_char(&mut self, value: i32) -> Result<()> {
        self.output.write_all(&[value as u8])?;
        Ok(())
    }

    pub fn write_newline(&mut self) -> Result<()> {
        self.output.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    fn read_token(&mut self) -> Result<Vec<u8>> {
        loop {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                return Ok(Vec::new());
            }
            let skip = buf.iter().take_while(|b| is_space(**b)).count();
            let exhausted = skip == buf.len();
            self.input.consume(skip);
            if !exhausted {
                break;
            }
        }

        let mut token = Vec::new();
        loop {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let take = buf.iter().take_while(|b| !is_space(**b)).count();
            token.extend_from_slice(&buf[..take]);
            let done = take < buf.len();
            self.input.consume(take);
            if done {
                break;
            }
        }
        Ok(token)
    }

    fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        self.input.read_until(b'\n', &mut line)?;
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// Whitespace as `isspace` sees it in the C locale
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}
