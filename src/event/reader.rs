//! JSON-lines trace reader.
//!
//! One event object per line:
//! `{"category": "SCHED/SWITCH_TO", "subject": 5, "tag": 0, "payload": ""}`.
//! Blank lines and `#` comments are skipped. The stream is consumed exactly
//! once; a malformed line aborts the run.

use super::schema::Event;
use crate::utils::error::ParseError;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Iterator over the events of a JSON-lines trace
pub struct TraceReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<Event, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ParseError::IoError(e))),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return Some(parse_event_line(trimmed, self.line_no));
        }
    }
}

/// Open a trace file for reading
pub fn open_trace(path: impl AsRef<Path>) -> Result<TraceReader<BufReader<File>>, ParseError> {
    let path = path.as_ref();
    debug!("Opening trace: {}", path.display());

    if path.is_dir() {
        return Err(ParseError::InvalidFormat(format!(
            "Trace path is a directory: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    Ok(TraceReader::new(BufReader::new(file)))
}

/// Parse a single trace line
pub fn parse_event_line(line: &str, line_no: usize) -> Result<Event, ParseError> {
    serde_json::from_str(line).map_err(|source| ParseError::JsonError {
        line: line_no,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Category;
    use std::io::Cursor;

    #[test]
    fn test_reads_events_skipping_comments() {
        let trace = "# header\n\
                     {\"category\": \"THREAD/CLASS_CONSTRUCTOR\", \"subject\": 2}\n\
                     \n\
                     {\"category\": \"MACHINE/ONE_INSTRUCTION\"}\n";

        let events: Vec<Event> = TraceReader::new(Cursor::new(trace))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].category, Category::SubjectCreated);
        assert_eq!(events[0].subject, 2);
        assert_eq!(events[1].category, Category::SingleTick);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let trace = "{\"category\": \"run\"}\n{not json}\n";
        let mut reader = TraceReader::new(Cursor::new(trace));

        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(ParseError::JsonError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_category_is_error() {
        assert!(parse_event_line("{\"subject\": 4}", 1).is_err());
    }

    #[test]
    fn test_open_trace_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            open_trace(dir.path()),
            Err(ParseError::InvalidFormat(_))
        ));
    }
}
