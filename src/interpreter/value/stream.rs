use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, BufRead, Write},
};

/// Where an [`OutputStream`] writes to.
#[derive(Debug)]
enum OutputSink {
    Stdout,
    Stderr,
    Buffer(String),
}

/// A writable stream handle.
///
/// Embedders and tests create buffered streams to capture what a script
/// prints.
///
/// # Example
/// ```
/// use ckl::interpreter::value::stream::OutputStream;
///
/// let out = OutputStream::buffer();
/// out.write("hello\n").unwrap();
/// assert_eq!(out.contents().as_deref(), Some("hello\n"));
/// ```
#[derive(Debug)]
pub struct OutputStream {
    sink: RefCell<OutputSink>,
}

impl OutputStream {
    /// A handle on the process's standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self { sink: RefCell::new(OutputSink::Stdout) }
    }

    /// A handle on the process's standard error.
    #[must_use]
    pub const fn stderr() -> Self {
        Self { sink: RefCell::new(OutputSink::Stderr) }
    }

    /// An in-memory stream.
    #[must_use]
    pub const fn buffer() -> Self {
        Self { sink: RefCell::new(OutputSink::Buffer(String::new())) }
    }

    /// Writes `text` without adding a newline.
    ///
    /// # Errors
    /// Propagates failures of the underlying stream.
    pub fn write(&self, text: &str) -> io::Result<()> {
        match &mut *self.sink.borrow_mut() {
            OutputSink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes())?;
                out.flush()
            },
            OutputSink::Stderr => io::stderr().lock().write_all(text.as_bytes()),
            OutputSink::Buffer(buffer) => {
                buffer.push_str(text);
                Ok(())
            },
        }
    }

    /// Returns everything written so far, for buffered streams.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        match &*self.sink.borrow() {
            OutputSink::Buffer(buffer) => Some(buffer.clone()),
            _ => None,
        }
    }
}

/// Where an [`InputStream`] reads from.
#[derive(Debug)]
enum InputSource {
    Stdin,
    Lines(VecDeque<String>),
}

/// A readable, line-oriented stream handle.
#[derive(Debug)]
pub struct InputStream {
    source: RefCell<InputSource>,
}

impl InputStream {
    /// A handle on the process's standard input.
    #[must_use]
    pub const fn stdin() -> Self {
        Self { source: RefCell::new(InputSource::Stdin) }
    }

    /// An in-memory stream over the lines of `text`.
    ///
    /// # Example
    /// ```
    /// use ckl::interpreter::value::stream::InputStream;
    ///
    /// let input = InputStream::from_text("a\nb\n");
    /// assert_eq!(input.read_line().unwrap().as_deref(), Some("a"));
    /// assert_eq!(input.read_all_lines().unwrap(), vec!["b".to_string()]);
    /// assert_eq!(input.read_line().unwrap(), None);
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self { source: RefCell::new(InputSource::Lines(text.lines().map(str::to_string).collect())) }
    }

    /// Reads the next line without its terminator, or `None` at the end.
    ///
    /// # Errors
    /// Propagates failures of the underlying stream.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        match &mut *self.source.borrow_mut() {
            InputSource::Stdin => {
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Ok(Some(line))
            },
            InputSource::Lines(lines) => Ok(lines.pop_front()),
        }
    }

    /// Reads every remaining line.
    ///
    /// # Errors
    /// Propagates failures of the underlying stream.
    pub fn read_all_lines(&self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            lines.push(line);
        }
        Ok(lines)
    }
}
