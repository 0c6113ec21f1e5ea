// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Page compression codecs.
//!
//! The page layer names an algorithm and hands buffers to a [`Codec`];
//! the implementations delegate to backend crates. UNCOMPRESSED is the
//! absence of a codec, LZO and ZSTD are recognized in metadata but have
//! no backend here.

use std::io::{Read, Write};

use crate::basic::Compression;
use crate::errors::{ParquetError, Result};

/// A compression backend for page buffers.
pub trait Codec: Send + std::fmt::Debug {
    /// Compresses `input`, appending to `output`.
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()>;

    /// Decompresses `input`, appending to `output`. `uncompress_size`
    /// is the expected decoded size, used to pre-size the buffer.
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut Vec<u8>,
        uncompress_size: Option<usize>,
    ) -> Result<()>;
}

/// Returns the codec for an algorithm, `None` for UNCOMPRESSED, and
/// `Unsupported` for algorithms without a backend.
pub fn create_codec(compression: Compression) -> Result<Option<Box<dyn Codec>>> {
    match compression {
        Compression::UNCOMPRESSED => Ok(None),
        Compression::SNAPPY => Ok(Some(Box::new(SnappyCodec::new()))),
        Compression::GZIP => Ok(Some(Box::new(GzipCodec::new()))),
        Compression::BROTLI => Ok(Some(Box::new(BrotliCodec::new()))),
        Compression::LZ4 => Ok(Some(Box::new(Lz4Codec::new()))),
        Compression::LZO | Compression::ZSTD => Err(unsupported_err!(
            "no {} backend is available",
            compression
        )),
    }
}

/// Snappy raw block format.
#[derive(Debug)]
struct SnappyCodec {
    encoder: snap::raw::Encoder,
    decoder: snap::raw::Decoder,
}

impl SnappyCodec {
    fn new() -> Self {
        Self {
            encoder: snap::raw::Encoder::new(),
            decoder: snap::raw::Decoder::new(),
        }
    }
}

impl Codec for SnappyCodec {
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        output.extend_from_slice(&self.encoder.compress_vec(input)?);
        Ok(())
    }

    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut Vec<u8>,
        uncompress_size: Option<usize>,
    ) -> Result<()> {
        if let Some(size) = uncompress_size {
            output.reserve(size);
        }
        output.extend_from_slice(&self.decoder.decompress_vec(input)?);
        Ok(())
    }
}

/// Gzip via flate2.
#[derive(Debug)]
struct GzipCodec;

impl GzipCodec {
    fn new() -> Self {
        Self
    }
}

impl Codec for GzipCodec {
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let mut encoder =
            flate2::write::GzEncoder::new(&mut *output, flate2::Compression::default());
        encoder.write_all(input)?;
        encoder.finish()?;
        Ok(())
    }

    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut Vec<u8>,
        uncompress_size: Option<usize>,
    ) -> Result<()> {
        if let Some(size) = uncompress_size {
            output.reserve(size);
        }
        let mut decoder = flate2::read::MultiGzDecoder::new(input);
        decoder.read_to_end(output)?;
        Ok(())
    }
}

const BROTLI_DEFAULT_BUFFER_SIZE: usize = 4096;
const BROTLI_DEFAULT_COMPRESSION_QUALITY: u32 = 1;
const BROTLI_DEFAULT_LG_WINDOW_SIZE: u32 = 22;

/// Brotli.
#[derive(Debug)]
struct BrotliCodec;

impl BrotliCodec {
    fn new() -> Self {
        Self
    }
}

impl Codec for BrotliCodec {
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let mut encoder = brotli::CompressorWriter::new(
            &mut *output,
            BROTLI_DEFAULT_BUFFER_SIZE,
            BROTLI_DEFAULT_COMPRESSION_QUALITY,
            BROTLI_DEFAULT_LG_WINDOW_SIZE,
        );
        encoder.write_all(input)?;
        encoder.flush()?;
        Ok(())
    }

    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut Vec<u8>,
        uncompress_size: Option<usize>,
    ) -> Result<()> {
        if let Some(size) = uncompress_size {
            output.reserve(size);
        }
        brotli::Decompressor::new(input, BROTLI_DEFAULT_BUFFER_SIZE)
            .read_to_end(output)?;
        Ok(())
    }
}

/// LZ4 frame format.
#[derive(Debug)]
struct Lz4Codec;

impl Lz4Codec {
    fn new() -> Self {
        Self
    }
}

impl Codec for Lz4Codec {
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let mut encoder = lz4_flex::frame::FrameEncoder::new(&mut *output);
        encoder.write_all(input)?;
        encoder
            .finish()
            .map_err(|e| ParquetError::External(Box::new(e)))?;
        Ok(())
    }

    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut Vec<u8>,
        uncompress_size: Option<usize>,
    ) -> Result<()> {
        if let Some(size) = uncompress_size {
            output.reserve(size);
        }
        let mut decoder = lz4_flex::frame::FrameDecoder::new(input);
        decoder.read_to_end(output)?;
        Ok(())
    }
}
