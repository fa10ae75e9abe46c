//! Shared fixture helper: builds ZIP archives record by record, so tests
//! control every byte the reader is going to parse.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

pub struct ArchiveBuilder {
    /// Local headers and payloads, in member order
    body: Vec<u8>,
    /// Accumulated central directory records
    central: Vec<u8>,
    entries: u16,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            central: Vec::new(),
            entries: 0,
        }
    }

    /// Add a member stored without compression.
    pub fn add_stored(&mut self, path: &str, data: &[u8]) -> &mut Self {
        let crc = crc32fast::hash(data);
        self.add_member(path, METHOD_STORED, crc, data, data.len() as u32, &[])
    }

    /// Add a deflate-compressed member.
    pub fn add_deflated(&mut self, path: &str, data: &[u8]) -> &mut Self {
        let crc = crc32fast::hash(data);
        let compressed = deflate(data);
        self.add_member(
            path,
            METHOD_DEFLATED,
            crc,
            &compressed,
            data.len() as u32,
            &[],
        )
    }

    /// Add a directory member (trailing slash, empty payload).
    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        assert!(path.ends_with('/'));
        self.add_member(path, METHOD_STORED, 0, &[], 0, &[])
    }

    /// Add a member with raw control over method, payload and declared
    /// checksum/size, for corruption tests.
    pub fn add_raw(
        &mut self,
        path: &str,
        method: u16,
        compressed: &[u8],
        crc: u32,
        uncompressed_size: u32,
    ) -> &mut Self {
        self.add_member(path, method, crc, compressed, uncompressed_size, &[])
    }

    /// Add a stored member whose local header carries an extra field the
    /// central record does not mention. The reader must honor the local
    /// header's own lengths when computing the payload offset.
    pub fn add_stored_with_local_extra(
        &mut self,
        path: &str,
        data: &[u8],
        local_extra: &[u8],
    ) -> &mut Self {
        let crc = crc32fast::hash(data);
        self.add_member(path, METHOD_STORED, crc, data, data.len() as u32, local_extra)
    }

    /// Add a stored member whose central record saturates the 32-bit size
    /// and offset fields and carries the real values in a ZIP64 extended
    /// information extra field.
    pub fn add_stored_zip64(&mut self, path: &str, data: &[u8]) -> &mut Self {
        let crc = crc32fast::hash(data);
        let offset = self.body.len() as u64;

        // Local header with real 32-bit values; only its lengths matter
        // to the reader.
        self.write_local_header(path, METHOD_STORED, crc, data.len() as u32, data.len() as u32, &[]);
        self.body.extend_from_slice(data);

        // ZIP64 extra field: uncompressed size, compressed size, offset
        let mut extra = Vec::new();
        extra.extend_from_slice(&0x0001u16.to_le_bytes());
        extra.extend_from_slice(&24u16.to_le_bytes());
        extra.extend_from_slice(&(data.len() as u64).to_le_bytes());
        extra.extend_from_slice(&(data.len() as u64).to_le_bytes());
        extra.extend_from_slice(&offset.to_le_bytes());

        self.write_central_header(
            path,
            METHOD_STORED,
            crc,
            0xFFFFFFFF,
            0xFFFFFFFF,
            0xFFFFFFFF,
            &extra,
        );
        self.entries += 1;
        self
    }

    fn add_member(
        &mut self,
        path: &str,
        method: u16,
        crc: u32,
        payload: &[u8],
        uncompressed_size: u32,
        local_extra: &[u8],
    ) -> &mut Self {
        let offset = self.body.len() as u32;
        self.write_local_header(
            path,
            method,
            crc,
            payload.len() as u32,
            uncompressed_size,
            local_extra,
        );
        self.body.extend_from_slice(payload);
        self.write_central_header(
            path,
            method,
            crc,
            payload.len() as u32,
            uncompressed_size,
            offset,
            &[],
        );
        self.entries += 1;
        self
    }

    fn write_local_header(
        &mut self,
        path: &str,
        method: u16,
        crc: u32,
        compressed_size: u32,
        uncompressed_size: u32,
        extra: &[u8],
    ) {
        let body = &mut self.body;
        body.extend_from_slice(b"PK\x03\x04");
        body.extend_from_slice(&20u16.to_le_bytes()); // version needed
        body.extend_from_slice(&0u16.to_le_bytes()); // flags
        body.extend_from_slice(&method.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes()); // mod time
        body.extend_from_slice(&0u16.to_le_bytes()); // mod date
        body.extend_from_slice(&crc.to_le_bytes());
        body.extend_from_slice(&compressed_size.to_le_bytes());
        body.extend_from_slice(&uncompressed_size.to_le_bytes());
        body.extend_from_slice(&(path.len() as u16).to_le_bytes());
        body.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        body.extend_from_slice(path.as_bytes());
        body.extend_from_slice(extra);
    }

    #[allow(clippy::too_many_arguments)]
    fn write_central_header(
        &mut self,
        path: &str,
        method: u16,
        crc: u32,
        compressed_size: u32,
        uncompressed_size: u32,
        lfh_offset: u32,
        extra: &[u8],
    ) {
        let central = &mut self.central;
        central.extend_from_slice(b"PK\x01\x02");
        central.extend_from_slice(&20u16.to_le_bytes()); // version made by
        central.extend_from_slice(&20u16.to_le_bytes()); // version needed
        central.extend_from_slice(&0u16.to_le_bytes()); // flags
        central.extend_from_slice(&method.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes()); // mod time
        central.extend_from_slice(&0u16.to_le_bytes()); // mod date
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&compressed_size.to_le_bytes());
        central.extend_from_slice(&uncompressed_size.to_le_bytes());
        central.extend_from_slice(&(path.len() as u16).to_le_bytes());
        central.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes()); // comment len
        central.extend_from_slice(&0u16.to_le_bytes()); // disk number start
        central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        central.extend_from_slice(&lfh_offset.to_le_bytes());
        central.extend_from_slice(path.as_bytes());
        central.extend_from_slice(extra);
    }

    /// Finalize into archive bytes, with an optional trailing comment.
    pub fn finish_with_comment(&self, comment: &[u8]) -> Vec<u8> {
        let mut out = self.body.clone();
        let cd_offset = out.len() as u32;
        out.extend_from_slice(&self.central);

        out.extend_from_slice(b"PK\x05\x06");
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number
        out.extend_from_slice(&0u16.to_le_bytes()); // disk with cd
        out.extend_from_slice(&self.entries.to_le_bytes());
        out.extend_from_slice(&self.entries.to_le_bytes());
        out.extend_from_slice(&(self.central.len() as u32).to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        out.extend_from_slice(comment);
        out
    }

    /// Finalize into archive bytes.
    pub fn finish(&self) -> Vec<u8> {
        self.finish_with_comment(&[])
    }

    /// Finalize with a ZIP64 end-of-directory chain: ZIP64 EOCD, locator,
    /// then a saturated classic EOCD.
    pub fn finish_zip64(&self) -> Vec<u8> {
        let mut out = self.body.clone();
        let cd_offset = out.len() as u64;
        out.extend_from_slice(&self.central);
        let eocd64_offset = out.len() as u64;

        // ZIP64 end of central directory record
        out.extend_from_slice(b"PK\x06\x06");
        out.extend_from_slice(&44u64.to_le_bytes()); // size of remaining record
        out.extend_from_slice(&45u16.to_le_bytes()); // version made by
        out.extend_from_slice(&45u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u32.to_le_bytes()); // disk number
        out.extend_from_slice(&0u32.to_le_bytes()); // disk with cd
        out.extend_from_slice(&(self.entries as u64).to_le_bytes());
        out.extend_from_slice(&(self.entries as u64).to_le_bytes());
        out.extend_from_slice(&(self.central.len() as u64).to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());

        // ZIP64 locator
        out.extend_from_slice(b"PK\x06\x07");
        out.extend_from_slice(&0u32.to_le_bytes()); // disk with zip64 eocd
        out.extend_from_slice(&eocd64_offset.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes()); // total disks

        // Classic EOCD with every field saturated
        out.extend_from_slice(b"PK\x05\x06");
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0xFFFFu16.to_le_bytes());
        out.extend_from_slice(&0xFFFFu16.to_le_bytes());
        out.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        out.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }
}

/// Raw-deflate `data` the way archive producers do.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
