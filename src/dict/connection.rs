use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;

const MAGIC: &[u8; 4] = b"HNCX";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 4 + 1 + 2; // magic + version + num_ids

/// Errors from loading connection-cost data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected HNCX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Backing storage for cost data: either owned or memory-mapped.
enum CostStorage {
    Owned(Vec<i16>),
    Mapped(Mmap),
}

/// POS bigram transition-cost matrix.
///
/// `cost(rid, lid)` is the Markov cost of placing a node with left POS
/// `lid` immediately after a node with right POS `rid`. Called once per
/// edge per Viterbi relaxation, so lookups stay branch-light; out-of-range
/// IDs cost 0.
pub struct Connector {
    num_ids: u16,
    storage: CostStorage,
}

impl Connector {
    /// Build from the text matrix format: line 1 is `num_ids` (or
    /// `num_left num_right`), then one cost per line in row-major order.
    pub fn from_text(text: &str) -> Result<Self, DataError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| DataError::Parse("empty matrix".to_string()))?;
        let parts: Vec<&str> = header.split_whitespace().collect();
        let num_ids: u16 = match parts.len() {
            1 => parts[0]
                .parse()
                .map_err(|e| DataError::Parse(format!("invalid num_ids: {e}")))?,
            2 => {
                let nl: u16 = parts[0]
                    .parse()
                    .map_err(|e| DataError::Parse(format!("invalid num_left: {e}")))?;
                let nr: u16 = parts[1]
                    .parse()
                    .map_err(|e| DataError::Parse(format!("invalid num_right: {e}")))?;
                if nl != nr {
                    return Err(DataError::Parse(format!(
                        "num_left ({nl}) != num_right ({nr})"
                    )));
                }
                nl
            }
            _ => {
                return Err(DataError::Parse(format!(
                    "expected 1 or 2 values in header, got {}",
                    parts.len()
                )))
            }
        };

        let expected = num_ids as usize * num_ids as usize;
        let mut costs = Vec::with_capacity(expected);
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let cost: i16 = line
                .parse()
                .map_err(|e| DataError::Parse(format!("invalid cost '{line}': {e}")))?;
            costs.push(cost);
        }
        if costs.len() != expected {
            return Err(DataError::Parse(format!(
                "expected {expected} costs, got {}",
                costs.len()
            )));
        }

        Ok(Self {
            num_ids,
            storage: CostStorage::Owned(costs),
        })
    }

    fn validate_header(data: &[u8]) -> Result<u16, DataError> {
        if data.len() < HEADER_SIZE {
            return Err(DataError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DataError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(DataError::UnsupportedVersion(data[4]));
        }
        let num_ids = u16::from_le_bytes([data[5], data[6]]);
        let expected = num_ids as usize * num_ids as usize * 2;
        if data.len() - HEADER_SIZE != expected {
            return Err(DataError::Parse(format!(
                "expected {expected} bytes of cost data, got {}",
                data.len() - HEADER_SIZE
            )));
        }
        Ok(num_ids)
    }

    /// Parse the compiled binary blob into an owned matrix.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DataError> {
        let num_ids = Self::validate_header(data)?;
        let costs: Vec<i16> = data[HEADER_SIZE..]
            .chunks_exact(2)
            .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        Ok(Self {
            num_ids,
            storage: CostStorage::Owned(costs),
        })
    }

    /// Load a compiled blob with memory-mapped I/O. The cost table is read
    /// directly from the mapping; the OS pages data in on demand.
    pub fn open(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path)?;
        // SAFETY: the file is opened read-only and the mapping is held for
        // the lifetime of this struct. The blob must not be modified while
        // the engine is running.
        let mmap = unsafe { Mmap::map(&file)? };
        let num_ids = Self::validate_header(&mmap)?;
        Ok(Self {
            num_ids,
            storage: CostStorage::Mapped(mmap),
        })
    }

    /// Serialize to the compiled binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.num_ids as usize * self.num_ids as usize;
        let mut buf = Vec::with_capacity(HEADER_SIZE + n * 2);
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&self.num_ids.to_le_bytes());
        for i in 0..n {
            let rid = (i / self.num_ids as usize) as u16;
            let lid = (i % self.num_ids as usize) as u16;
            buf.extend_from_slice(&self.cost_raw(rid, lid).to_le_bytes());
        }
        buf
    }

    pub fn save(&self, path: &Path) -> Result<(), DataError> {
        Ok(fs::write(path, self.to_bytes())?)
    }

    pub fn num_ids(&self) -> u16 {
        self.num_ids
    }

    fn cost_raw(&self, rid: u16, lid: u16) -> i16 {
        let idx = rid as usize * self.num_ids as usize + lid as usize;
        match &self.storage {
            CostStorage::Owned(costs) => costs.get(idx).copied().unwrap_or(0),
            CostStorage::Mapped(mmap) => {
                let offset = HEADER_SIZE + idx * 2;
                mmap.get(offset..offset + 2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .unwrap_or(0)
            }
        }
    }

    /// Transition cost from a node with right POS `rid` to a following
    /// node with left POS `lid`.
    pub fn cost(&self, rid: u16, lid: u16) -> i32 {
        if rid >= self.num_ids || lid >= self.num_ids {
            return 0;
        }
        i32::from(self.cost_raw(rid, lid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_matrix() -> Connector {
        // 3x3 matrix with cost = rid * 10 + lid
        let mut text = String::from("3\n");
        for rid in 0..3 {
            for lid in 0..3 {
                text.push_str(&format!("{}\n", rid * 10 + lid));
            }
        }
        Connector::from_text(&text).unwrap()
    }

    #[test]
    fn test_from_text_lookup() {
        let conn = small_matrix();
        assert_eq!(conn.num_ids(), 3);
        assert_eq!(conn.cost(0, 0), 0);
        assert_eq!(conn.cost(1, 2), 12);
        assert_eq!(conn.cost(2, 1), 21);
    }

    #[test]
    fn test_out_of_range_is_zero() {
        let conn = small_matrix();
        assert_eq!(conn.cost(3, 0), 0);
        assert_eq!(conn.cost(0, 500), 0);
    }

    #[test]
    fn test_two_value_header() {
        let conn = Connector::from_text("2 2\n0\n1\n2\n3\n").unwrap();
        assert_eq!(conn.cost(1, 1), 3);
    }

    #[test]
    fn test_header_mismatch() {
        assert!(Connector::from_text("2 3\n").is_err());
        assert!(Connector::from_text("2\n0\n1\n").is_err());
    }

    #[test]
    fn test_binary_roundtrip() {
        let conn = small_matrix();
        let bytes = conn.to_bytes();
        let reloaded = Connector::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.num_ids(), 3);
        for rid in 0..3 {
            for lid in 0..3 {
                assert_eq!(reloaded.cost(rid, lid), conn.cost(rid, lid));
            }
        }
    }

    #[test]
    fn test_invalid_blobs() {
        assert!(matches!(
            Connector::from_bytes(b"XXXX\x01\x02\x00"),
            Err(DataError::InvalidMagic)
        ));
        assert!(matches!(
            Connector::from_bytes(b"HNC"),
            Err(DataError::InvalidHeader)
        ));
        assert!(matches!(
            Connector::from_bytes(b"HNCX\x63\x02\x00"),
            Err(DataError::UnsupportedVersion(0x63))
        ));
    }
}
