// ABOUTME: Byte source for the NBT decoder, with optional gzip/zlib transport.
// ABOUTME: Exposes exact big-endian primitive reads and length-prefixed byte reads.

#![allow(clippy::missing_errors_doc)]

use std::io::{self, Chain, Cursor, Read};

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};

/// The transport layer wrapped around an NBT document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Compression {
    /// Raw NBT bytes
    #[default]
    None = 0,
    /// gzip stream (RFC 1952)
    GZip = 1,
    /// zlib stream (RFC 1950)
    ZLib = 2,
}

impl TryFrom<u8> for Compression {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Compression::None),
            1 => Ok(Compression::GZip),
            2 => Ok(Compression::ZLib),
            _ => Err(Error::UnknownCompression(code)),
        }
    }
}

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Header bytes already consumed for validation, replayed ahead of the rest.
type Replayed<R> = Chain<Cursor<Vec<u8>>, R>;

enum Transport<R: Read> {
    Plain(R),
    GZip(GzDecoder<Replayed<R>>),
    ZLib(ZlibDecoder<Replayed<R>>),
}

impl<R: Read> Read for Transport<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(r) => r.read(buf),
            Transport::GZip(r) => r.read(buf),
            Transport::ZLib(r) => r.read(buf),
        }
    }
}

/// A sequential, single-pass reader over a (possibly compressed) NBT stream.
pub struct Reader<R: Read> {
    inner: Transport<R>,
}

impl<R: Read> Reader<R> {
    /// Wrap `input` in the selected transport.
    ///
    /// The gzip or zlib header is checked here, so a stream that is not in
    /// the selected format fails before any tag is read.
    pub fn new(compression: Compression, mut input: R) -> Result<Self> {
        let inner = match compression {
            Compression::None => Transport::Plain(input),
            Compression::GZip => {
                let header = read_header::<3>(&mut input, "gzip")?;
                if header != GZIP_MAGIC {
                    return Err(Error::Compression("invalid gzip header".into()));
                }
                Transport::GZip(GzDecoder::new(replay(&header, input)))
            }
            Compression::ZLib => {
                let header = read_header::<2>(&mut input, "zlib")?;
                let (cmf, flg) = (header[0], header[1]);
                if cmf & 0x0f != 8 || (u16::from(cmf) << 8 | u16::from(flg)) % 31 != 0 {
                    return Err(Error::Compression("invalid zlib header".into()));
                }
                Transport::ZLib(ZlibDecoder::new(replay(&header, input)))
            }
        };
        Ok(Self { inner })
    }

    /// Wrap an uncompressed stream.
    pub fn new_plain(input: R) -> Self {
        Self {
            inner: Transport::Plain(input),
        }
    }

    /// Read exactly `N` bytes.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Read exactly `len` raw bytes.
    ///
    /// The buffer grows as data arrives rather than trusting the declared
    /// length up front.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let read = (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if read < len {
            return Err(Error::Truncated);
        }
        Ok(buf)
    }

    /// Read a `u16` length followed by that many bytes.
    pub fn read_u16_prefixed(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u16()?;
        self.read_bytes(usize::from(len))
    }

    /// Read a `u32` length followed by that many bytes.
    pub fn read_u32_prefixed(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32()?;
        self.read_bytes(len as usize)
    }

    /// Skip exactly `len` bytes.
    pub fn skip(&mut self, len: u64) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        if skipped < len {
            return Err(Error::Truncated);
        }
        Ok(())
    }

    /// Check whether the stream is exhausted. Consumes a byte if it is not.
    pub fn is_at_end(&mut self) -> Result<bool> {
        let mut next = [0u8; 1];
        loop {
            match self.inner.read(&mut next) {
                Ok(n) => return Ok(n == 0),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn read_header<const N: usize>(input: &mut impl Read, transport: &str) -> Result<[u8; N]> {
    let mut header = [0u8; N];
    input
        .read_exact(&mut header)
        .map_err(|e| Error::Compression(format!("cannot read {transport} header: {e}")))?;
    Ok(header)
}

fn replay<R: Read>(header: &[u8], rest: R) -> Replayed<R> {
    Cursor::new(header.to_vec()).chain(rest)
}
