//! Binary persistence of assignments.
//!
//! The on-disk layout is little-endian: a 32-bit magic, a 16-bit format
//! version, the element count, then one record per element. A record is a
//! one-byte kind tag and the variable id, followed by the kind's payload:
//! a value for integers; start, duration and performedness for intervals;
//! three length-prefixed index lists for sequences.

use std::io::Read;
use std::io::Write;

use thiserror::Error;

use super::Assignment;
use crate::containers::StorageKey;
use crate::variables::IntervalVar;
use crate::variables::IntVar;
use crate::variables::SequenceVar;

const MAGIC: u32 = 0x5047_5254;
const FORMAT_VERSION: u16 = 1;

const KIND_INT: u8 = 0;
const KIND_INTERVAL: u8 = 1;
const KIND_SEQUENCE: u8 = 2;

/// The ways reading a persisted assignment can fail.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("unknown element kind {0}")]
    UnknownKind(u8),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn write_assignment<W: Write>(writer: &mut W, assignment: &Assignment) -> std::io::Result<()> {
    writer.write_all(&MAGIC.to_le_bytes())?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;

    let num_elements = assignment.int_elements().len()
        + assignment.interval_elements().len()
        + assignment.sequence_elements().len();
    writer.write_all(&(num_elements as u32).to_le_bytes())?;

    for element in assignment.int_elements() {
        writer.write_all(&[KIND_INT])?;
        writer.write_all(&element.var.id().to_le_bytes())?;
        writer.write_all(&element.value.to_le_bytes())?;
    }
    for element in assignment.interval_elements() {
        writer.write_all(&[KIND_INTERVAL])?;
        writer.write_all(&element.var.id().to_le_bytes())?;
        writer.write_all(&element.start.to_le_bytes())?;
        writer.write_all(&element.duration.to_le_bytes())?;
        writer.write_all(&[element.performed as u8])?;
    }
    for element in assignment.sequence_elements() {
        writer.write_all(&[KIND_SEQUENCE])?;
        writer.write_all(&element.var.id().to_le_bytes())?;
        write_index_list(writer, &element.forward)?;
        write_index_list(writer, &element.backward)?;
        write_index_list(writer, &element.unperformed)?;
    }
    Ok(())
}

pub fn read_assignment<R: Read>(reader: &mut R) -> Result<Assignment, ReadError> {
    let magic = read_u32(reader)?;
    if magic != MAGIC {
        return Err(ReadError::BadMagic(magic));
    }
    let version = read_u16(reader)?;
    if version != FORMAT_VERSION {
        return Err(ReadError::UnsupportedVersion(version));
    }

    let num_elements = read_u32(reader)?;
    let mut assignment = Assignment::default();
    for _ in 0..num_elements {
        let kind = read_u8(reader)?;
        let id = read_u32(reader)? as usize;
        match kind {
            KIND_INT => {
                let value = read_i64(reader)?;
                assignment.set_value(IntVar::create_from_index(id), value);
            }
            KIND_INTERVAL => {
                let start = read_i64(reader)?;
                let duration = read_i64(reader)?;
                let performed = read_u8(reader)? != 0;
                assignment.set_interval(
                    IntervalVar::create_from_index(id),
                    start,
                    duration,
                    performed,
                );
            }
            KIND_SEQUENCE => {
                let forward = read_index_list(reader)?;
                let backward = read_index_list(reader)?;
                let unperformed = read_index_list(reader)?;
                assignment.set_sequence(
                    SequenceVar::create_from_index(id),
                    forward,
                    backward,
                    unperformed,
                );
            }
            other => return Err(ReadError::UnknownKind(other)),
        }
    }
    Ok(assignment)
}

fn write_index_list<W: Write>(writer: &mut W, list: &[u32]) -> std::io::Result<()> {
    writer.write_all(&(list.len() as u32).to_le_bytes())?;
    for &index in list {
        writer.write_all(&index.to_le_bytes())?;
    }
    Ok(())
}

fn read_index_list<R: Read>(reader: &mut R) -> Result<Vec<u32>, ReadError> {
    let len = read_u32(reader)?;
    (0..len).map(|_| read_u32(reader)).collect()
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, ReadError> {
    let mut buffer = [0u8; 1];
    reader.read_exact(&mut buffer)?;
    Ok(buffer[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, ReadError> {
    let mut buffer = [0u8; 2];
    reader.read_exact(&mut buffer)?;
    Ok(u16::from_le_bytes(buffer))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ReadError> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64, ReadError> {
    let mut buffer = [0u8; 8];
    reader.read_exact(&mut buffer)?;
    Ok(i64::from_le_bytes(buffer))
}
