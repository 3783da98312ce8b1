//! Synthesizes a command line from the bytes a fuzzer writes to stdin.
//!
//! The whole input lives in one preallocated buffer and every argument is a span into it, so an
//! [`Argv`] is created once per process by the entry point and handed to whoever needs it. Slot 0
//! is reserved for the program name, real arguments start at 1 and [`Argv::argc`] counts slot 0,
//! exactly like the `argc`/`argv` pair a C `main` receives.

use std::io::{self, Read};
use std::ops::Range;

use log::{debug, trace};

use crate::config::{MAX_CMDLINE_LEN, MAX_CMDLINE_PAR};
use crate::error::{Error, Result};

/// Number of input bytes read from the stream. Two bytes of the buffer stay reserved for the
/// terminators of the last argument.
pub const MAX_INPUT_LEN: usize = MAX_CMDLINE_LEN - 2;
/// Number of real arguments, slot 0 excluded.
pub const MAX_ARGS: usize = MAX_CMDLINE_PAR - 1;

/// Whitespace as understood by C's `isspace` in the "C" locale.
pub const fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argv {
    buf: Vec<u8>,
    program: Vec<u8>,
    spans: Vec<Range<usize>>,
}

impl Argv {
    /// Reads the argument vector from the process' standard input.
    pub fn from_stdin() -> Result<Self> {
        Self::read_from(io::stdin().lock())
    }

    /// Reads at most [`MAX_INPUT_LEN`] bytes from `reader` and splits them into arguments.
    ///
    /// A short or empty read yields fewer (or zero) arguments. A NUL byte ends the input. Input
    /// longer than the buffer or with more than [`MAX_ARGS`] arguments is rejected.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut buf = Vec::with_capacity(MAX_INPUT_LEN + 1);
        reader
            .take(MAX_INPUT_LEN as u64 + 1)
            .read_to_end(&mut buf)?;

        if let Some(nul) = buf.iter().position(|&byte| byte == 0) {
            trace!("input terminated by NUL at offset {}", nul);
            buf.truncate(nul);
        } else if buf.len() > MAX_INPUT_LEN {
            return Err(Error::InputTooLarge {
                capacity: MAX_INPUT_LEN,
            });
        }

        let spans = split(&buf)?;
        debug!("materialized {} arguments from {} bytes", spans.len(), buf.len());

        Ok(Argv {
            buf,
            program: Vec::new(),
            spans,
        })
    }

    /// Counts the program name slot, so an input without arguments has `argc() == 1`.
    pub fn argc(&self) -> usize {
        self.spans.len() + 1
    }

    /// True if the input held no arguments.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Slot `index` of the vector. Slot 0 is the program name, which is empty unless set.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        match index {
            0 => Some(&self.program),
            _ => self
                .spans
                .get(index - 1)
                .map(|span| &self.buf[span.clone()]),
        }
    }

    pub fn program_name(&self) -> &[u8] {
        &self.program
    }

    pub fn set_program_name(&mut self, name: impl Into<Vec<u8>>) {
        self.program = name.into();
    }

    /// The real arguments, slot 1 onwards.
    pub fn args(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.spans.iter().map(move |span| &self.buf[span.clone()])
    }

    /// The real arguments as strings, invalid UTF-8 replaced.
    pub fn to_strings(&self) -> Vec<String> {
        self.args()
            .map(|arg| String::from_utf8_lossy(arg).into_owned())
            .collect()
    }
}

fn split(buf: &[u8]) -> Result<Vec<Range<usize>>> {
    let mut spans = Vec::with_capacity(MAX_ARGS.min(buf.len() / 2 + 1));
    let mut pos = 0;

    loop {
        while pos < buf.len() && is_space(buf[pos]) {
            pos += 1;
        }
        if pos == buf.len() {
            return Ok(spans);
        }

        let start = pos;
        while pos < buf.len() && !is_space(buf[pos]) {
            pos += 1;
        }

        if spans.len() == MAX_ARGS {
            return Err(Error::TooManyTokens { capacity: MAX_ARGS });
        }
        spans.push(start..pos);
    }
}
