use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{JunctionRecord, SectionRecord, TrackPieceRecord, CURRENT_FORMAT_VERSION};
use crate::error::{Result, TrackError};
use crate::models::{Groups, Junctions, Sections, TrackNetwork, TrackSection};

fn write_record<T: Serialize>(bytes: &mut Vec<u8>, record: &T) -> Result<()> {
    bincode::serialize_into(bytes, record)?;
    Ok(())
}

fn write_count(bytes: &mut Vec<u8>, count: usize, what: &str) -> Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| TrackError::InvalidState(format!("Too many {what} to save: {count}")))?;
    bytes.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

fn read_record<T: DeserializeOwned>(reader: &mut &[u8]) -> Result<T> {
    Ok(bincode::deserialize_from(reader)?)
}

/// Serialize every registered section and every junction of a network
///
/// Layout: `[u32 LE version][u32 section count][piece records][u32 junction
/// count][junction records]`. Sections are written in ascending id order and
/// groups are renumbered from 1 in the order they are first seen. Links are
/// not written; they are rebuilt by autoconnect on load.
///
/// # Errors
///
/// Returns `InvalidState` if a junction references an unregistered section
pub fn save_network(network: &TrackNetwork) -> Result<Vec<u8>> {
    let registered = network.database().registered();

    let mut bytes = Vec::with_capacity(12 + registered.len() * 42);
    bytes.extend_from_slice(&CURRENT_FORMAT_VERSION.to_le_bytes());

    let mut group_numbers = HashMap::new();
    write_count(&mut bytes, registered.len(), "sections")?;
    for &(_, handle) in &registered {
        let section = network.try_section(handle)?;
        let group_id = match section.group() {
            Some(group) => {
                let next = u16::try_from(group_numbers.len() + 1)
                    .map_err(|_| TrackError::InvalidState("Too many groups to save".to_string()))?;
                *group_numbers.entry(group).or_insert(next)
            }
            None => 0,
        };
        write_record(
            &mut bytes,
            &TrackPieceRecord {
                section: SectionRecord::from(section),
                group_id,
            },
        )?;
    }

    let registered_id = |handle| {
        network
            .section(handle)
            .map(TrackSection::id)
            .filter(|&id| id != 0)
            .ok_or_else(|| {
                TrackError::InvalidState(format!("Junction uses unregistered section {handle:?}"))
            })
    };

    let junctions: Vec<_> = network.junctions().collect();
    write_count(&mut bytes, junctions.len(), "junctions")?;
    for (_, junction) in junctions {
        write_record(
            &mut bytes,
            &JunctionRecord {
                entry_id: registered_id(junction.entry())?,
                left_id: registered_id(junction.left())?,
                right_id: registered_id(junction.right())?,
                go_left: junction.go_left(),
            },
        )?;
    }

    log::debug!("Saved {} sections into {} bytes", registered.len(), bytes.len());
    Ok(bytes)
}

/// Replace the contents of a network with a saved one
///
/// The whole input is decoded and checked before the network is touched, so a
/// failed load leaves it as it was. Sections are registered with their stored
/// ids and autoconnected in file order, then groups and junctions are rebuilt.
///
/// # Errors
///
/// Returns `CorruptData` for a bad header, unsupported version, zero or
/// duplicate ids, invalid geometry or junctions naming unknown or repeated ids, and
/// `Encoding` if the data is truncated
pub fn load_network(network: &mut TrackNetwork, bytes: &[u8]) -> Result<()> {
    if bytes.len() < 4 {
        return Err(TrackError::CorruptData("Invalid track file: too small".to_string()));
    }
    let version_bytes: [u8; 4] = bytes[0..4]
        .try_into()
        .map_err(|_| TrackError::CorruptData("Invalid version header".to_string()))?;
    let version = u32::from_le_bytes(version_bytes);
    if version != CURRENT_FORMAT_VERSION {
        return Err(TrackError::CorruptData(format!("Unsupported track file version: {version}")));
    }

    let mut reader = &bytes[4..];

    let section_count: u32 = read_record(&mut reader)?;
    let mut pieces = Vec::new();
    let mut ids = HashSet::new();
    for _ in 0..section_count {
        let record: TrackPieceRecord = read_record(&mut reader)?;
        let id = record.section.id;
        if id == 0 {
            return Err(TrackError::CorruptData("Track with id 0".to_string()));
        }
        if !ids.insert(id) {
            return Err(TrackError::CorruptData(format!("Duplicate track id {id}")));
        }
        pieces.push((record.section.to_section()?, record.group_id));
    }

    let junction_count: u32 = read_record(&mut reader)?;
    let mut junctions = Vec::new();
    for _ in 0..junction_count {
        let record: JunctionRecord = read_record(&mut reader)?;
        for id in [record.entry_id, record.left_id, record.right_id] {
            if !ids.contains(&id) {
                return Err(TrackError::CorruptData(format!("Junction references unknown track {id}")));
            }
        }
        if record.entry_id == record.left_id
            || record.entry_id == record.right_id
            || record.left_id == record.right_id
        {
            return Err(TrackError::CorruptData(format!(
                "Junction repeats a track: {} / {} / {}",
                record.entry_id, record.left_id, record.right_id
            )));
        }
        junctions.push(record);
    }

    if !reader.is_empty() {
        log::warn!("Ignoring {} trailing bytes in track file", reader.len());
    }

    // Swapped into `network` only once fully built
    let mut loaded = TrackNetwork::with_config(network.config().clone())?;

    let mut groups: IndexMap<u16, Vec<_>> = IndexMap::new();
    for (section, group_id) in pieces {
        let handle = loaded.insert_section(section);
        loaded.commit_section(handle, true)?;
        if group_id != 0 {
            groups.entry(group_id).or_default().push(handle);
        }
    }
    for members in groups.values() {
        loaded.create_group(members)?;
    }

    for record in junctions {
        let lookup = |id| {
            loaded
                .section_by_id(id)
                .ok_or_else(|| TrackError::CorruptData(format!("Junction references unknown track {id}")))
        };
        let (entry, left, right) = (lookup(record.entry_id)?, lookup(record.left_id)?, lookup(record.right_id)?);
        let id = loaded
            .add_junction(entry, left, right)
            .map_err(|e| TrackError::CorruptData(format!("Invalid junction: {e}")))?;
        loaded.set_junction(id, record.go_left)?;
    }

    log::debug!(
        "Loaded {} sections and {} junctions",
        loaded.database().len(),
        loaded.junctions().count()
    );
    *network = loaded;
    Ok(())
}
