//! JSON-lines landmark source.
//!
//! Lets an external detector process (or a recorded session) feed the stack.
//! Each line is one camera frame:
//!
//! ```text
//! null                                   ← no hand in this frame
//! [{"x":0.51,"y":0.62}, … 21 objects …]  ← one detected hand
//! ```
//!
//! Blank lines count as "no hand".  A line that fails to parse is reported as
//! [`HandspinError::Replay`] and only that frame is lost.  End of input is
//! reported as [`HandspinError::SourceExhausted`].

use std::fs::File;
use std::io::{BufRead, BufReader, Stdin};
use std::path::Path;
use std::thread;
use std::time::Duration;

use handspin_types::{HandspinError, Landmark};
use tracing::{debug, info};

use crate::landmark_source::LandmarkSource;

/// Reads landmark frames from any buffered reader, one per line.
pub struct JsonlLandmarkSource<R> {
    id: String,
    reader: R,
    line_no: usize,
    frame_interval: Duration,
    buf: String,
}

impl<R: BufRead + Send> JsonlLandmarkSource<R> {
    pub fn new(id: impl Into<String>, reader: R) -> Self {
        Self {
            id: id.into(),
            reader,
            line_no: 0,
            frame_interval: Duration::ZERO,
            buf: String::new(),
        }
    }

    /// Pace playback of a recorded file, e.g. 33 ms for 30 fps.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    fn parse_line(&self, line: &str) -> Result<Option<Vec<Landmark>>, HandspinError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<Vec<Landmark>>>(line).map_err(|e| HandspinError::Replay {
            line: self.line_no,
            details: e.to_string(),
        })
    }
}

impl JsonlLandmarkSource<BufReader<File>> {
    /// Open a recorded session file.
    ///
    /// # Errors
    ///
    /// Returns [`HandspinError::AcquisitionFailure`] if the file cannot be
    /// opened.
    pub fn open(path: &Path) -> Result<Self, HandspinError> {
        let file = File::open(path).map_err(|e| HandspinError::AcquisitionFailure {
            source_id: path.display().to_string(),
            details: e.to_string(),
        })?;
        info!(path = %path.display(), "replaying landmarks from file");
        Ok(Self::new(path.display().to_string(), BufReader::new(file)))
    }
}

impl JsonlLandmarkSource<BufReader<Stdin>> {
    /// Read frames piped into standard input.
    pub fn stdin() -> Self {
        info!("reading landmarks from stdin");
        Self::new("stdin", BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead + Send> LandmarkSource for JsonlLandmarkSource<R> {
    fn id(&self) -> &str {
        &self.id
    }

    fn try_get_frame(&mut self) -> Result<Option<Vec<Landmark>>, HandspinError> {
        if !self.frame_interval.is_zero() {
            thread::sleep(self.frame_interval);
        }

        self.buf.clear();
        let read = self
            .reader
            .read_line(&mut self.buf)
            .map_err(|e| HandspinError::AcquisitionFailure {
                source_id: self.id.clone(),
                details: e.to_string(),
            })?;
        if read == 0 {
            return Err(HandspinError::SourceExhausted(self.id.clone()));
        }
        self.line_no += 1;

        let frame = self.parse_line(&self.buf)?;
        debug!(
            source = %self.id,
            line = self.line_no,
            points = frame.as_ref().map_or(0, Vec::len),
            "replayed frame"
        );
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn hand_line(x: f32, y: f32) -> String {
        let points = vec![Landmark::new(x, y); 21];
        serde_json::to_string(&points).unwrap()
    }

    #[test]
    fn reads_hands_and_empty_frames() {
        let input = format!("{}\nnull\n\n{}\n", hand_line(0.1, 0.2), hand_line(0.3, 0.4));
        let mut src = JsonlLandmarkSource::new("mem", Cursor::new(input));

        let first = src.try_get_frame().unwrap().unwrap();
        assert_eq!(first.len(), 21);
        assert_eq!(first[0], Landmark::new(0.1, 0.2));
        assert_eq!(src.try_get_frame().unwrap(), None);
        assert_eq!(src.try_get_frame().unwrap(), None);
        assert_eq!(src.try_get_frame().unwrap().unwrap()[20], Landmark::new(0.3, 0.4));
        assert_eq!(
            src.try_get_frame(),
            Err(HandspinError::SourceExhausted("mem".to_string()))
        );
    }

    #[test]
    fn wrong_point_count_is_passed_through() {
        let input = r#"[{"x":0.5,"y":0.5},{"x":0.6,"y":0.6}]"#;
        let mut src = JsonlLandmarkSource::new("mem", Cursor::new(input));
        assert_eq!(src.try_get_frame().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn bad_line_loses_only_that_frame() {
        let input = format!("{{not json\n{}\n", hand_line(0.5, 0.5));
        let mut src = JsonlLandmarkSource::new("mem", Cursor::new(input));
        match src.try_get_frame() {
            Err(HandspinError::Replay { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected replay error, got {other:?}"),
        }
        assert!(src.try_get_frame().unwrap().is_some());
    }

    #[test]
    fn open_reads_file_and_reports_missing_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        writeln!(file, "null").unwrap();
        writeln!(file, "{}", hand_line(0.2, 0.8)).unwrap();

        let mut src = JsonlLandmarkSource::open(file.path()).expect("open");
        assert_eq!(src.try_get_frame().unwrap(), None);
        assert!(src.try_get_frame().unwrap().is_some());
        assert!(src.try_get_frame().is_err());

        let missing = JsonlLandmarkSource::open(Path::new("/definitely/not/here.jsonl"));
        assert!(matches!(
            missing,
            Err(HandspinError::AcquisitionFailure { .. })
        ));
    }
}
