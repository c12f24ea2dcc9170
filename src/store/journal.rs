//! Append-only transaction journal
//!
//! The journal record format is:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Sequence Number  | (u64 LE)
//! +------------------+
//! | Transaction Id   | (u64 LE)
//! +------------------+
//! | Record Type      | (u8: 0=insert, 1=update, 2=delete, 3=commit)
//! +------------------+
//! | Table            | (u8: 0=clientes, 1=consentimientos, 2=auditoria)
//! +------------------+
//! | Row Id           | (i64 LE)
//! +------------------+
//! | Row Payload      | (length-prefixed bytes, JSON row; empty for
//! |                  |  delete and commit records)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself. A transaction is
//! its operation records followed by one COMMIT record; everything is
//! appended, then fsynced once. Acknowledgment before fsync is forbidden.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};

/// Journal file location under the data directory
const JOURNAL_SUBDIR: &str = "journal";
const JOURNAL_FILE: &str = "journal.log";

/// Record type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// New row
    Insert = 0,
    /// Full replacement of an existing row
    Update = 1,
    /// Physical row removal
    Delete = 2,
    /// Transaction commit marker
    Commit = 3,
}

impl RecordType {
    fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(RecordType::Insert),
            1 => Some(RecordType::Update),
            2 => Some(RecordType::Delete),
            3 => Some(RecordType::Commit),
            _ => None,
        }
    }
}

/// Logical table tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Clientes = 0,
    Consentimientos = 1,
    Auditoria = 2,
}

impl Table {
    /// Table name as persisted state is described externally
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Clientes => "clientes",
            Table::Consentimientos => "consentimientos",
            Table::Auditoria => "auditoria",
        }
    }

    fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Table::Clientes),
            1 => Some(Table::Consentimientos),
            2 => Some(Table::Auditoria),
            _ => None,
        }
    }
}

/// One journal record, as written to disk.
///
/// Commit markers carry no row data: `table` is a placeholder tag,
/// `row_id` is 0 and `payload` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRecord {
    /// Monotonic sequence number (starts at 1, never reused)
    pub sequence: u64,
    /// Transaction this record belongs to
    pub txn_id: u64,
    /// What the record does
    pub record_type: RecordType,
    /// Which table the row belongs to
    pub table: Table,
    /// Business row id
    pub row_id: i64,
    /// JSON-encoded row (empty for delete/commit)
    pub payload: Vec<u8>,
}

impl JournalRecord {
    /// An operation record carrying row data
    pub fn op(
        sequence: u64,
        txn_id: u64,
        record_type: RecordType,
        table: Table,
        row_id: i64,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            sequence,
            txn_id,
            record_type,
            table,
            row_id,
            payload,
        }
    }

    /// A commit marker closing `txn_id`
    pub fn commit(sequence: u64, txn_id: u64) -> Self {
        Self {
            sequence,
            txn_id,
            record_type: RecordType::Commit,
            table: Table::Clientes,
            row_id: 0,
            payload: Vec::new(),
        }
    }

    /// Serialize the record body (everything except length prefix and
    /// checksum). This is part of the data the checksum covers.
    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(30 + self.payload.len());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.txn_id.to_le_bytes());
        buf.push(self.record_type as u8);
        buf.push(self.table as u8);
        buf.extend_from_slice(&self.row_id.to_le_bytes());
        buf.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Serialize the complete record to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();

        // Record length = 4 (length) + body.len() + 4 (checksum)
        let record_length = (4 + body.len() + 4) as u32;

        // Checksum covers: length + body
        let mut checksum_data = Vec::with_capacity(4 + body.len());
        checksum_data.extend_from_slice(&record_length.to_le_bytes());
        checksum_data.extend_from_slice(&body);
        let checksum = crc32fast::hash(&checksum_data);

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying the checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        // len + seq + txn + type + table + row_id + payload_len + checksum
        const MIN_RECORD_SIZE: usize = 4 + 8 + 8 + 1 + 1 + 8 + 4 + 4;

        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        // Extract and verify checksum
        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);

        let computed_checksum = crc32fast::hash(&data[0..checksum_offset]);
        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        fn read_u64<R: Read>(reader: &mut R) -> io::Result<u64> {
            let mut buf = [0u8; 8];
            reader.read_exact(&mut buf)?;
            Ok(u64::from_le_bytes(buf))
        }

        fn read_u8<R: Read>(reader: &mut R) -> io::Result<u8> {
            let mut buf = [0u8; 1];
            reader.read_exact(&mut buf)?;
            Ok(buf[0])
        }

        let sequence = read_u64(&mut cursor)?;
        let txn_id = read_u64(&mut cursor)?;

        let record_type = RecordType::from_u8(read_u8(&mut cursor)?).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "unknown record type tag")
        })?;
        let table = Table::from_u8(read_u8(&mut cursor)?)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown table tag"))?;

        let mut row_id_buf = [0u8; 8];
        cursor.read_exact(&mut row_id_buf)?;
        let row_id = i64::from_le_bytes(row_id_buf);

        let mut len_buf = [0u8; 4];
        cursor.read_exact(&mut len_buf)?;
        let payload_len = u32::from_le_bytes(len_buf) as usize;

        let mut payload = vec![0u8; payload_len];
        cursor.read_exact(&mut payload)?;

        Ok((
            Self {
                sequence,
                txn_id,
                record_type,
                table,
                row_id,
                payload,
            },
            record_length,
        ))
    }
}

/// Resolve the journal file path for a data directory
pub fn journal_path(data_dir: &Path) -> PathBuf {
    data_dir.join(JOURNAL_SUBDIR).join(JOURNAL_FILE)
}

/// Journal writer that enforces one fsync per committed transaction.
///
/// Append-only, single file, opened with exclusive write access by the
/// owning store. Acknowledgment happens only after `sync_all` returns.
pub struct JournalWriter {
    path: PathBuf,
    file: File,
    /// Next sequence number to assign (starts at 1, never reused)
    next_sequence: u64,
}

impl JournalWriter {
    /// Open the journal for appending, creating directories and the file
    /// as needed. `next_sequence` comes from the recovery scan; `valid_len`
    /// is the byte length of the journal's valid prefix - anything past it
    /// is a torn tail from a crashed commit and is truncated away.
    pub fn open(data_dir: &Path, next_sequence: u64, valid_len: u64) -> StoreResult<Self> {
        let path = journal_path(data_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .read(true)
            .open(&path)?;

        if file.metadata()?.len() > valid_len {
            file.set_len(valid_len)?;
            file.sync_all()?;
        }

        // Position at end for appends
        let file = {
            drop(file);
            OpenOptions::new().append(true).open(&path)?
        };

        Ok(Self {
            path,
            file,
            next_sequence,
        })
    }

    /// Path to the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next sequence number that will be assigned
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Append a whole transaction: every operation record, then the
    /// commit marker, then exactly one fsync.
    ///
    /// On any error nothing is acknowledged; the recovery scan discards
    /// an uncommitted tail.
    pub fn append_txn(
        &mut self,
        txn_id: u64,
        ops: &[(RecordType, Table, i64, Vec<u8>)],
    ) -> StoreResult<()> {
        use std::io::Write;

        let mut buf = Vec::new();
        let mut sequence = self.next_sequence;

        for (record_type, table, row_id, payload) in ops {
            let record = JournalRecord::op(
                sequence,
                txn_id,
                *record_type,
                *table,
                *row_id,
                payload.clone(),
            );
            buf.extend_from_slice(&record.serialize());
            sequence += 1;
        }

        let commit = JournalRecord::commit(sequence, txn_id);
        buf.extend_from_slice(&commit.serialize());
        sequence += 1;

        self.file.write_all(&buf)?;

        // Commit point: the transaction exists once this returns
        self.file.sync_all()?;

        self.next_sequence = sequence;
        Ok(())
    }
}

/// Outcome of a recovery scan over the journal.
pub struct RecoveredJournal {
    /// Records of committed transactions, in commit order
    pub committed: Vec<JournalRecord>,
    /// Next sequence number to assign
    pub next_sequence: u64,
    /// Highest committed transaction id
    pub last_txn_id: u64,
    /// Byte length of the valid prefix (end of the last commit marker)
    pub valid_len: u64,
}

/// Replays the journal from disk.
///
/// Only operation groups closed by a COMMIT record are returned. A torn
/// or checksum-corrupt tail ends the scan; it is a crash artifact, not an
/// error.
pub fn recover(data_dir: &Path) -> StoreResult<RecoveredJournal> {
    let path = journal_path(data_dir);

    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(StoreError::Io(e)),
    };

    let mut committed = Vec::new();
    let mut pending: Vec<JournalRecord> = Vec::new();
    let mut next_sequence = 1u64;
    let mut last_txn_id = 0u64;
    let mut valid_len = 0u64;
    let mut offset = 0usize;

    while offset < data.len() {
        let (record, consumed) = match JournalRecord::deserialize(&data[offset..]) {
            Ok(parsed) => parsed,
            // Torn tail: stop at the last commit boundary
            Err(_) => break,
        };
        offset += consumed;

        next_sequence = next_sequence.max(record.sequence + 1);

        match record.record_type {
            RecordType::Commit => {
                let txn_id = record.txn_id;
                committed.extend(pending.drain(..).filter(|r| r.txn_id == txn_id));
                last_txn_id = last_txn_id.max(txn_id);
                valid_len = offset as u64;
            }
            _ => pending.push(record),
        }
    }

    Ok(RecoveredJournal {
        committed,
        next_sequence,
        last_txn_id,
        valid_len,
    })
}
