//! Globally unique identifiers for spans, segments and traces.
//!
//! An [`Id`] is three integers: the application instance that produced it,
//! the thread that produced it, and a sequence combining a millisecond
//! timestamp with a per-thread counter. Generation state lives in a
//! thread-local [`IdContext`], so generating never takes a lock.

mod context;
mod generator;

pub use context::{IdContext, SEQ_PER_MILLI};
pub use generator::{Clock, GlobalIdGenerator, InstanceRegistry, SystemClock};

use crate::core::{Result, TraceStackError, UniqueId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a span, segment or trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Id {
    /// Application instance id of the owning process
    pub owner_id: u32,
    /// Id of the thread that generated this id
    pub sequencer_id: u64,
    /// Timestamp component * 10000 + thread counter
    pub unique_seq: i64,
}

impl Id {
    /// Timestamp component of the sequence; a random value if the clock went backward
    pub fn timestamp_part(&self) -> i64 {
        self.unique_seq.div_euclid(SEQ_PER_MILLI)
    }

    /// Per-thread counter component of the sequence, in `0..10000`
    pub fn seq_part(&self) -> i64 {
        self.unique_seq.rem_euclid(SEQ_PER_MILLI)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.owner_id,
            self.sequencer_id,
            self.timestamp_part(),
            self.seq_part()
        )
    }
}

impl FromStr for Id {
    type Err = TraceStackError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return Err(TraceStackError::parse(format!(
                "expected owner.sequencer.timestamp.seq, got {:?}",
                s
            )));
        }

        let field = |idx: usize, name: &str| -> Result<i64> {
            parts[idx]
                .parse::<i64>()
                .map_err(|e| TraceStackError::parse(format!("invalid {} in {:?}: {}", name, s, e)))
        };

        let owner_id = u32::try_from(field(0, "owner id")?)
            .map_err(|_| TraceStackError::parse(format!("owner id out of range in {:?}", s)))?;
        let sequencer_id = u64::try_from(field(1, "sequencer id")?)
            .map_err(|_| TraceStackError::parse(format!("sequencer id out of range in {:?}", s)))?;
        let timestamp = field(2, "timestamp")?;
        let seq = field(3, "sequence")?;
        if !(0..SEQ_PER_MILLI).contains(&seq) {
            return Err(TraceStackError::parse(format!("sequence out of range in {:?}", s)));
        }

        let unique_seq = timestamp
            .checked_mul(SEQ_PER_MILLI)
            .and_then(|v| v.checked_add(seq))
            .ok_or_else(|| TraceStackError::parse(format!("timestamp out of range in {:?}", s)))?;

        Ok(Id {
            owner_id,
            sequencer_id,
            unique_seq,
        })
    }
}

impl From<Id> for UniqueId {
    fn from(id: Id) -> Self {
        // Sequencer ids are assigned from a counter and stay far below i64::MAX.
        let sequencer = i64::try_from(id.sequencer_id).unwrap_or(i64::MAX);
        UniqueId::new(vec![i64::from(id.owner_id), sequencer, id.unique_seq])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = Id {
            owner_id: 3,
            sequencer_id: 17,
            unique_seq: 1_500_000_000_000 * SEQ_PER_MILLI + 42,
        };
        assert_eq!(id.to_string(), "3.17.1500000000000.42");
        assert_eq!(id.to_string().parse::<Id>().unwrap(), id);
    }

    #[test]
    fn test_negative_timestamp_component_is_lossless() {
        // Random timestamp components used after a clock regression may be negative.
        let id = Id {
            owner_id: 1,
            sequencer_id: 2,
            unique_seq: -123_456 * SEQ_PER_MILLI + 9_999,
        };
        assert_eq!(id.timestamp_part(), -123_456);
        assert_eq!(id.seq_part(), 9_999);
        assert_eq!(id.to_string().parse::<Id>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("1.2.3".parse::<Id>().is_err());
        assert!("1.2.3.10000".parse::<Id>().is_err());
        assert!("-1.2.3.4".parse::<Id>().is_err());
        assert!("a.2.3.4".parse::<Id>().is_err());
    }

    #[test]
    fn test_into_unique_id() {
        let id = Id {
            owner_id: 5,
            sequencer_id: 9,
            unique_seq: 77,
        };
        let unique: UniqueId = id.into();
        assert_eq!(unique.id_parts, vec![5, 9, 77]);
        assert_eq!(unique.to_segment_id(), "5.9.77");
    }
}
