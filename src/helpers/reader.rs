use crate::error::RosterError;
use crate::spreadsheet::SpreadsheetError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

/// Leading bytes of every zip local file header.
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// A reader over a spreadsheet package held either on disk or in memory
pub enum SourceReader {
    /// Local file reader
    File(BufReader<File>),
    /// Uploaded bytes (in-memory buffer)
    Memory(Cursor<Vec<u8>>),
}

impl SourceReader {
    /// Opens a local spreadsheet file
    ///
    /// # Arguments
    /// * `path` - Path to the file
    ///
    /// # Returns
    /// * `Result<SourceReader, RosterError>` - Reader for the file content
    pub fn open(path: impl AsRef<Path>) -> Result<SourceReader, RosterError> {
        let file = File::open(path)?;
        Ok(SourceReader::File(BufReader::new(file)))
    }

    /// Wraps bytes received from an upload
    pub fn from_bytes(bytes: Vec<u8>) -> SourceReader {
        SourceReader::Memory(Cursor::new(bytes))
    }

    /// Verifies that the content starts with a zip header and rewinds the reader.
    ///
    /// `name` is only used to build the error message.
    pub(crate) fn ensure_zip_package(&mut self, name: &str) -> Result<(), RosterError> {
        let mut magic = [0u8; 4];
        let read = read_up_to(self, &mut magic)?;
        self.seek(SeekFrom::Start(0))?;
        if read < magic.len() || magic != ZIP_MAGIC {
            Err(SpreadsheetError::InvalidFileFormat(name.to_owned()))?
        }
        Ok(())
    }
}

/// Reads until `buffer` is full or the source is exhausted.
fn read_up_to<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<usize, RosterError> {
    let mut total = 0;
    while total < buffer.len() {
        match reader.read(&mut buffer[total..])? {
            0 => break,
            count => total += count,
        }
    }
    Ok(total)
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            SourceReader::File(reader) => reader.read(buf),
            SourceReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            SourceReader::File(reader) => reader.seek(pos),
            SourceReader::Memory(reader) => reader.seek(pos),
        }
    }
}
