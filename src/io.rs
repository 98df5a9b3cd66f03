// io.rs
//
// Column files of SAS measurements: one point per line, `q I dI` in the first three columns.
// Input may be gzip compressed; output is compressed when the path ends in `.gz`.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::channels::Measurement;
use crate::error::RebinError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

pub struct InputStream {
    filepath: PathBuf,
}

impl InputStream {
    pub fn new(filepath: &Path) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    fn is_gzipped(file: &mut File) -> Result<bool, RebinError> {
        let mut header = [0u8; 2];
        // Files shorter than the magic number are plain text
        let gzipped = file.read_exact(&mut header).is_ok() && header == GZIP_MAGIC;
        // Reset the file pointer
        file.rewind()?;
        Ok(gzipped)
    }

    pub fn reader(&self) -> Result<BufReader<Box<dyn Read>>, RebinError> {
        let mut file = File::open(&self.filepath)?;
        let reader: Box<dyn Read> = if Self::is_gzipped(&mut file)? {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, reader))
    }
}

#[derive(Clone)]
pub struct OutputStreamBuilder {
    filepath: Option<PathBuf>,
    buffer_size: usize,
    compression_level: Compression,
}

impl Default for OutputStreamBuilder {
    fn default() -> Self {
        Self {
            filepath: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            compression_level: Compression::default(),
        }
    }
}

impl OutputStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filepath(mut self, path: Option<impl AsRef<Path>>) -> Self {
        self.filepath = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Gzip level for `.gz` outputs; ignored for plain files and stdout.
    pub fn compression_level(mut self, level: Compression) -> Self {
        self.compression_level = level;
        self
    }

    pub fn build(self) -> OutputStream {
        OutputStream {
            filepath: self.filepath,
            buffer_size: self.buffer_size,
            compression_level: self.compression_level,
        }
    }
}

/// A buffered writer to a file, or to stdout when no path is given.
pub struct OutputStream {
    filepath: Option<PathBuf>,
    buffer_size: usize,
    compression_level: Compression,
}

impl OutputStream {
    pub fn new(filepath: Option<impl AsRef<Path>>) -> Self {
        OutputStreamBuilder::new().filepath(filepath).build()
    }

    pub fn builder() -> OutputStreamBuilder {
        OutputStreamBuilder::new()
    }

    fn should_compress(&self) -> bool {
        self.filepath
            .as_ref()
            .is_some_and(|p| p.extension().is_some_and(|ext| ext == "gz"))
    }

    pub fn writer(&self) -> Result<OutputWriter, RebinError> {
        let writer = match &self.filepath {
            Some(path) => {
                let file = File::create(path)?;
                if self.should_compress() {
                    OutputWriter::Gzip(BufWriter::with_capacity(
                        self.buffer_size,
                        GzEncoder::new(file, self.compression_level),
                    ))
                } else {
                    OutputWriter::File(BufWriter::with_capacity(self.buffer_size, file))
                }
            }
            None => OutputWriter::Stdout(BufWriter::with_capacity(self.buffer_size, io::stdout())),
        };
        Ok(writer)
    }
}

/// Writer returned by [`OutputStream::writer`].
///
/// Call [`OutputWriter::finish`] when done: dropping it discards any error from the final flush
/// or the gzip trailer.
pub enum OutputWriter {
    File(BufWriter<File>),
    Gzip(BufWriter<GzEncoder<File>>),
    Stdout(BufWriter<io::Stdout>),
}

impl OutputWriter {
    /// Flush buffered data and, for gzip output, write the trailer.
    pub fn finish(self) -> Result<(), RebinError> {
        match self {
            OutputWriter::File(writer) => {
                writer.into_inner().map_err(|e| e.into_error())?;
            }
            OutputWriter::Gzip(writer) => {
                let encoder = writer.into_inner().map_err(|e| e.into_error())?;
                encoder.finish()?;
            }
            OutputWriter::Stdout(mut writer) => writer.flush()?,
        }
        Ok(())
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputWriter::File(writer) => writer.write(buf),
            OutputWriter::Gzip(writer) => writer.write(buf),
            OutputWriter::Stdout(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputWriter::File(writer) => writer.flush(),
            OutputWriter::Gzip(writer) => writer.flush(),
            OutputWriter::Stdout(writer) => writer.flush(),
        }
    }
}

/// How the columns of a data file are separated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delimiter {
    /// Any run of spaces and tabs.
    #[default]
    Whitespace,
    /// A single delimiter byte, e.g. `b','` or `b'\t'`.
    Byte(u8),
}

#[derive(Clone, Debug)]
pub struct ReadOptions {
    pub delimiter: Delimiter,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
    /// Skip the first non-comment line.
    pub skip_header: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            comment: Some(b'#'),
            skip_header: false,
        }
    }
}

/// One output row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub q: f64,
    #[serde(rename = "I")]
    pub intensity: f64,
    #[serde(rename = "dI")]
    pub error: f64,
}

/// Read a measurement from the first three columns of a (possibly gzipped) text file.
///
/// Rows with fewer than three fields are skipped with a warning; a field that is not a number
/// is an error.
pub fn read_measurement(path: &Path, options: &ReadOptions) -> Result<Measurement, RebinError> {
    let reader = InputStream::new(path).reader()?;
    let measurement = match options.delimiter {
        Delimiter::Whitespace => read_whitespace(reader, options)?,
        Delimiter::Byte(delimiter) => read_delimited(reader, delimiter, options)?,
    };
    debug!(
        path = %path.display(),
        points = measurement.len(),
        "read measurement"
    );
    Ok(measurement)
}

fn read_whitespace<R: BufRead>(
    reader: R,
    options: &ReadOptions,
) -> Result<Measurement, RebinError> {
    let mut measurement = Measurement::default();
    let mut header_pending = options.skip_header;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = options.comment {
            if line.as_bytes()[0] == comment {
                continue;
            }
        }
        if header_pending {
            header_pending = false;
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            warn!("skipping line {} - insufficient fields", line_no + 1);
            continue;
        }
        measurement.push(fields[0].parse()?, fields[1].parse()?, fields[2].parse()?);
    }

    Ok(measurement)
}

fn read_delimited<R: Read>(
    reader: R,
    delimiter: u8,
    options: &ReadOptions,
) -> Result<Measurement, RebinError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(options.skip_header)
        .comment(options.comment)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut measurement = Measurement::default();
    for (row_no, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.len() < 3 {
            warn!("skipping row {} - insufficient fields", row_no + 1);
            continue;
        }
        measurement.push(record[0].parse()?, record[1].parse()?, record[2].parse()?);
    }

    Ok(measurement)
}

/// Write a measurement as tab-separated `q I dI` rows, preceded by a `# q I dI` comment line
/// when `header` is set.
///
/// Returns the underlying writer once every row has been handed to it, so the caller can
/// finish it (see [`OutputWriter::finish`]).
pub fn write_measurement<W: Write>(
    mut writer: W,
    measurement: &Measurement,
    header: bool,
) -> Result<W, RebinError> {
    if header {
        writeln!(writer, "# q\tI\tdI")?;
    }
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);
    for (q, intensity, error) in measurement.points() {
        csv_writer.serialize(MeasurementRow {
            q,
            intensity,
            error,
        })?;
    }
    let writer = csv_writer.into_inner().map_err(|e| e.into_error())?;
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDir;
    use std::fs;

    #[test]
    fn test_read_whitespace_columns() -> Result<(), RebinError> {
        let dir = TestDir::new("read_whitespace")?;
        let path = dir.path().join("sample.dat");
        fs::write(
            &path,
            "# SAXS curve\n\
             q   I    dI\n\
             0.01  100.0   1.5   extra\n\
             \n\
             0.02\t90.0\t1.25\n\
             0.03 80.0\n\
             0.04   70.0   1.0\n",
        )?;

        let options = ReadOptions {
            skip_header: true,
            ..ReadOptions::default()
        };
        let m = read_measurement(&path, &options)?;
        assert_eq!(m.q, vec![0.01, 0.02, 0.04]);
        assert_eq!(m.intensity, vec![100.0, 90.0, 70.0]);
        assert_eq!(m.error, vec![1.5, 1.25, 1.0]);
        Ok(())
    }

    #[test]
    fn test_read_delimited_columns() -> Result<(), RebinError> {
        let dir = TestDir::new("read_delimited")?;
        let path = dir.path().join("sample.csv");
        fs::write(&path, "q,I,dI\n0.1, 5.0, 0.5\n0.2,4.0,0.4\n")?;

        let options = ReadOptions {
            delimiter: Delimiter::Byte(b','),
            comment: None,
            skip_header: true,
        };
        let m = read_measurement(&path, &options)?;
        assert_eq!(m.len(), 2);
        assert_eq!(m.points().last(), Some((0.2, 4.0, 0.4)));
        Ok(())
    }

    #[test]
    fn test_non_numeric_field_is_an_error() -> Result<(), RebinError> {
        let dir = TestDir::new("read_invalid")?;
        let path = dir.path().join("bad.dat");
        fs::write(&path, "q I dI\n0.1 5.0 0.5\n")?;

        let result = read_measurement(&path, &ReadOptions::default());
        assert!(matches!(result, Err(RebinError::ParseFloatError(_))));
        Ok(())
    }

    #[test]
    fn test_gzip_round_trip() -> Result<(), RebinError> {
        let dir = TestDir::new("gzip_round_trip")?;
        let path = dir.path().join("curve.dat.gz");
        let m = Measurement::new(
            vec![0.001, 0.002, 0.5],
            vec![1.0e6, 2.5e5, 3.25],
            vec![1.0e3, 0.125, 0.1],
        )?;

        let writer = OutputStream::new(Some(&path)).writer()?;
        write_measurement(writer, &m, true)?.finish()?;

        let mut magic = [0u8; 2];
        File::open(&path)?.read_exact(&mut magic)?;
        assert_eq!(magic, GZIP_MAGIC);

        let read_back = read_measurement(&path, &ReadOptions::default())?;
        assert_eq!(read_back, m);
        Ok(())
    }

    #[test]
    fn test_write_header_line() -> Result<(), RebinError> {
        let m = Measurement::new(vec![0.5], vec![2.0], vec![0.25])?;
        let buffer = write_measurement(Vec::new(), &m, true)?;
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "# q\tI\tdI\n0.5\t2.0\t0.25\n");

        let buffer = write_measurement(Vec::new(), &m, false)?;
        assert_eq!(buffer, b"0.5\t2.0\t0.25\n");
        Ok(())
    }

    #[test]
    fn test_compression_level() -> Result<(), RebinError> {
        let dir = TestDir::new("compression_level")?;
        let q: Vec<f64> = (0..2000).map(|i| i as f64 * 1e-3).collect();
        let m = Measurement::new(q.clone(), q.clone(), q)?;

        let mut sizes = Vec::new();
        for (name, level) in [("none.dat.gz", 0), ("best.dat.gz", 9)] {
            let path = dir.path().join(name);
            let output = OutputStream::builder()
                .filepath(Some(&path))
                .buffer_size(4096)
                .compression_level(Compression::new(level))
                .build();
            write_measurement(output.writer()?, &m, true)?.finish()?;

            assert_eq!(read_measurement(&path, &ReadOptions::default())?, m);
            sizes.push(fs::metadata(&path)?.len());
        }
        assert!(sizes[1] < sizes[0]);
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_finish_reports_write_errors() -> Result<(), RebinError> {
        // Writes to /dev/full fail with ENOSPC once the buffer is flushed
        let m = Measurement::new(vec![0.5], vec![2.0], vec![0.25])?;
        let writer = OutputStream::new(Some("/dev/full")).writer()?;
        let writer = write_measurement(writer, &m, true)?;
        assert!(matches!(writer.finish(), Err(RebinError::IOError(_))));
        Ok(())
    }
}
