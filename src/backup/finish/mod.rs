use flate2::write::GzEncoder;
use std::io::{Error, Seek, Write};
use zip::ZipWriter;

/// Writes the trailer of an encoding layer and hands back the inner writer.
///
/// Layered writers are finished innermost first, e.g. tar, then gzip, then
/// the caller's stream.
pub trait Finish<O> {
    fn finish(self) -> Result<O, Error>;
}

impl<W: Write> Finish<W> for GzEncoder<W> {
    fn finish(self) -> Result<W, Error> {
        self.finish()
    }
}

impl<W: Write + Seek> Finish<W> for ZipWriter<W> {
    fn finish(self) -> Result<W, Error> {
        self.finish().map_err(Error::other)
    }
}
