use sip_types::Code;
use sip_types::msg::StatusLine;
use std::mem::take;

/// State of a [`ResponseCollector`] after a line was pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectState {
    AwaitingLine,
    Complete,
}

/// Lines of one response, up to its terminating empty line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    lines: Vec<String>,
}

impl ResponseRecord {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The parsed leading line, `None` if it isn't a status line
    pub fn status_line(&self) -> Option<StatusLine> {
        self.lines.first().and_then(|line| StatusLine::from_line(line))
    }
}

/// Consumes received lines until the expected number of responses is complete.
///
/// A response is considered complete at the first empty line after it. Bodies are not
/// supported, the `Content-Length` header is not inspected.
#[derive(Debug)]
pub struct ResponseCollector {
    expected_responses: usize,
    lines: Vec<String>,
    codes: Vec<Code>,
    records: Vec<ResponseRecord>,
    current: Vec<String>,
}

impl ResponseCollector {
    /// Collector waiting for `expected_responses` responses, at least one
    pub fn new(expected_responses: usize) -> Self {
        Self {
            expected_responses: expected_responses.max(1),
            lines: Vec::new(),
            codes: Vec::new(),
            records: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: String) -> CollectState {
        debug_assert_eq!(self.state(), CollectState::AwaitingLine);

        if let Some(status) = StatusLine::from_line(&line) {
            log::debug!("received {:?} response {status}", status.code.kind());

            self.codes.push(status.code);
        }

        if line.is_empty() {
            self.records.push(ResponseRecord {
                lines: take(&mut self.current),
            });
        } else {
            self.current.push(line.clone());
        }

        self.lines.push(line);

        self.state()
    }

    pub fn state(&self) -> CollectState {
        if self.records.len() >= self.expected_responses {
            CollectState::Complete
        } else {
            CollectState::AwaitingLine
        }
    }

    pub fn expected_responses(&self) -> usize {
        self.expected_responses
    }

    /// Number of responses terminated so far
    pub fn completed(&self) -> usize {
        self.records.len()
    }

    /// The very first line received, which must be a status line
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// Status codes of all status lines, in receipt order
    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    pub fn finish(self) -> Collected {
        Collected {
            lines: self.lines,
            codes: self.codes,
            records: self.records,
        }
    }
}

/// Everything a [`ResponseCollector`] gathered
#[derive(Debug)]
pub struct Collected {
    pub lines: Vec<String>,
    pub codes: Vec<Code>,
    pub records: Vec<ResponseRecord>,
}
