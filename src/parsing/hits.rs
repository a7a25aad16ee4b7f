use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;
use tracing::warn;

use crate::core::hit::RawHit;
use crate::core::segment::SegmentRun;
use crate::core::types::ScoreKind;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid hit on line {line}: {message}")]
    InvalidFormat { line: usize, message: String },
}

/// One parsed line: the query it belongs to and the hit
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub query_id: String,
    pub hit: RawHit,
}

/// Open a hit table for reading: `-` is stdin and a `.gz` extension is decompressed
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads a whitespace-separated hit table, one hit per line:
///
/// ```text
/// # query_id  match_id  score  boundaries          [coverage]
/// query1      1cukA01   1e-20  12-45,60-80         0.93
/// query1      1cukA02   3e-08  40-110
/// ```
///
/// Boundaries are inclusive residue ranges. Blank lines and lines starting with
/// `#` are ignored. A line whose boundaries are malformed (e.g. reversed or
/// overlapping ranges) is skipped with a warning; any other malformed line is an
/// error.
pub struct HitReader<R> {
    reader: R,
    score_kind: ScoreKind,
    line_num: usize,
    buffer: String,
    skipped: usize,
}

impl<R: BufRead> HitReader<R> {
    pub fn new(reader: R, score_kind: ScoreKind) -> Self {
        Self {
            reader,
            score_kind,
            line_num: 0,
            buffer: String::new(),
            skipped: 0,
        }
    }

    /// Number of lines skipped for bad boundaries so far
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse_line(&mut self) -> Result<Option<HitRecord>, ParseError> {
        let line = self.buffer.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let line_num = self.line_num;
        let invalid = |message: String| ParseError::InvalidFormat {
            line: line_num,
            message,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 && fields.len() != 5 {
            return Err(invalid(format!(
                "expected 4 or 5 fields, found {}",
                fields.len()
            )));
        }

        let score: f64 = fields[2]
            .parse()
            .map_err(|_| invalid(format!("invalid score '{}'", fields[2])))?;
        if !score.is_finite() {
            return Err(invalid(format!("score '{}' is not finite", fields[2])));
        }

        let coverage = match fields.get(4) {
            Some(text) => {
                let coverage: f64 = text
                    .parse()
                    .map_err(|_| invalid(format!("invalid coverage '{text}'")))?;
                if !(0.0..=1.0).contains(&coverage) {
                    return Err(invalid(format!("coverage {coverage} is not between 0 and 1")));
                }
                Some(coverage)
            }
            None => None,
        };

        let run: SegmentRun = match fields[3].parse() {
            Ok(run) => run,
            Err(e) => {
                warn!("Skipping hit on line {line_num} with bad boundaries '{}': {e}", fields[3]);
                self.skipped += 1;
                return Ok(None);
            }
        };

        let mut hit = RawHit::new(fields[1], score, self.score_kind, run);
        hit.coverage = coverage;
        Ok(Some(HitRecord {
            query_id: fields[0].to_string(),
            hit,
        }))
    }
}

impl<R: BufRead> Iterator for HitReader<R> {
    type Item = Result<HitRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => self.line_num += 1,
                Err(e) => return Some(Err(e.into())),
            }
            match self.parse_line() {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Parse a whole hit table held in memory
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for the first malformed line.
pub fn parse_hits_text(text: &str, score_kind: ScoreKind) -> Result<Vec<HitRecord>, ParseError> {
    HitReader::new(text.as_bytes(), score_kind).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_hits_text() {
        let text = "\
# query match score boundaries coverage
q1\t1cukA01\t1e-20\t12-45,60-80\t0.93

q1  1cukA02  3e-08  40-110
q2 dc_0123456789abcdef0123456789abcdef 2.5e-3 5-50
";
        let records = parse_hits_text(text, ScoreKind::Evalue).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].query_id, "q1");
        assert_eq!(records[0].hit.match_id, "1cukA01");
        assert_eq!(records[0].hit.run.num_segments(), 2);
        assert_eq!(records[0].hit.coverage, Some(0.93));
        assert_eq!(records[1].hit.coverage, None);
        assert_eq!(records[2].query_id, "q2");
        assert_eq!(records[2].hit.score_kind, ScoreKind::Evalue);
    }

    #[test]
    fn test_bad_field_count_reports_line() {
        let text = "q1 m1 1.0 1-10\nq1 m2 1.0\n";
        match parse_hits_text(text, ScoreKind::CrhScore) {
            Err(ParseError::InvalidFormat { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("found 3"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_score_and_coverage() {
        assert!(matches!(
            parse_hits_text("q1 m1 abc 1-10\n", ScoreKind::CrhScore),
            Err(ParseError::InvalidFormat { line: 1, .. })
        ));
        assert!(parse_hits_text("q1 m1 NaN 1-10\n", ScoreKind::CrhScore).is_err());
        assert!(parse_hits_text("q1 m1 1.0 1-10 1.5\n", ScoreKind::CrhScore).is_err());
    }

    #[test]
    fn test_bad_boundaries_are_skipped() {
        let text = "q1 m1 1.0 10-5\nq1 m2 1.0 1-10,11-20\nq1 m3 1.0 1-10\n";
        let mut reader = HitReader::new(text.as_bytes(), ScoreKind::CrhScore);
        let records: Vec<HitRecord> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hit.match_id, "m3");
        assert_eq!(reader.skipped(), 2);
    }

    #[test]
    fn test_out_of_range_residue_is_skipped() {
        let text = "q1 m1 5 1-4294967295\nq1 m2 5 1-10\n";
        let mut reader = HitReader::new(text.as_bytes(), ScoreKind::CrhScore);
        let records: Vec<HitRecord> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hit.match_id, "m2");
        assert_eq!(reader.skipped(), 1);
    }

    #[test]
    fn test_open_gzipped_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hits.txt.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"q1 m1 5.0 1-10\n").unwrap();
        encoder.finish().unwrap();

        let reader = open_input(&path).unwrap();
        let records: Vec<HitRecord> = HitReader::new(reader, ScoreKind::Bitscore)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hit.score, 5.0);
    }
}
