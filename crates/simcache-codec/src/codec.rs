//! The capture/restore contract and the default full-state codec.

use serde::de::DeserializeOwned;
use serde::Serialize;
use simcache_core::{CacheError, Snapshot};

/// Captures a subject's state as a [`Snapshot`] and restores it later.
///
/// `restore` must invert `capture` for every field the codec retains.
/// Fields a codec does not retain are unspecified after `restore`, and
/// replay-driven code must not read them.
pub trait SnapshotCodec<S> {
    /// Serialize the subject's current state.
    fn capture(&self, subject: &S) -> Result<Snapshot, CacheError>;

    /// Overwrite the subject's state from a previously captured snapshot.
    ///
    /// Returns [`CacheError::CorruptCache`] if the payload cannot be decoded.
    fn restore(&self, subject: &mut S, snapshot: &Snapshot) -> Result<(), CacheError>;
}

/// Serializes the whole subject with `bitcode` through its serde impls.
///
/// Restore replaces the subject wholesale, running flag included.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use simcache_codec::{FullStateCodec, SnapshotCodec};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct State { tick: u64, running: bool }
///
/// let codec = FullStateCodec;
/// let snap = codec.capture(&State { tick: 7, running: true }).unwrap();
///
/// let mut restored = State { tick: 0, running: false };
/// codec.restore(&mut restored, &snap).unwrap();
/// assert_eq!(restored, State { tick: 7, running: true });
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FullStateCodec;

impl<S> SnapshotCodec<S> for FullStateCodec
where
    S: Serialize + DeserializeOwned,
{
    fn capture(&self, subject: &S) -> Result<Snapshot, CacheError> {
        encode_state(subject)
    }

    fn restore(&self, subject: &mut S, snapshot: &Snapshot) -> Result<(), CacheError> {
        *subject = decode_state(snapshot)?;
        Ok(())
    }
}

/// Serialize any serde value into a snapshot payload.
pub(crate) fn encode_state<T: Serialize + ?Sized>(value: &T) -> Result<Snapshot, CacheError> {
    bitcode::serialize(value)
        .map(Snapshot::new)
        .map_err(|e| CacheError::EncodingFailed {
            detail: e.to_string(),
        })
}

/// Deserialize a snapshot payload back into a serde value.
pub(crate) fn decode_state<T: DeserializeOwned>(snapshot: &Snapshot) -> Result<T, CacheError> {
    bitcode::deserialize(snapshot.as_bytes())
        .map_err(|e| CacheError::corrupt(format!("snapshot could not be decoded: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Walker {
        position: (i32, i32),
        trail: Vec<(i32, i32)>,
        running: bool,
    }

    #[test]
    fn restore_overwrites_every_field() {
        let recorded = Walker {
            position: (3, -1),
            trail: vec![(0, 0), (1, 0), (2, -1)],
            running: false,
        };
        let snap = FullStateCodec.capture(&recorded).unwrap();

        let mut replayed = Walker {
            position: (0, 0),
            trail: vec![],
            running: true,
        };
        FullStateCodec.restore(&mut replayed, &snap).unwrap();
        assert_eq!(replayed, recorded);
    }

    #[test]
    fn garbage_payload_is_corrupt() {
        let mut w = Walker {
            position: (0, 0),
            trail: vec![],
            running: true,
        };
        let err = FullStateCodec
            .restore(&mut w, &Snapshot::from(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, CacheError::CorruptCache { .. }));
        // A failed restore leaves the subject untouched.
        assert!(w.running);
    }

    #[test]
    fn captures_are_deterministic() {
        let w = Walker {
            position: (5, 5),
            trail: vec![(1, 1); 16],
            running: true,
        };
        let a = FullStateCodec.capture(&w).unwrap();
        let b = FullStateCodec.capture(&w).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn unserializable_state_reports_encoding_failure() {
        struct Poisoned;
        impl Serialize for Poisoned {
            fn serialize<Se: serde::Serializer>(&self, _: Se) -> Result<Se::Ok, Se::Error> {
                Err(serde::ser::Error::custom("poisoned field"))
            }
        }

        let err = encode_state(&Poisoned).unwrap_err();
        assert!(matches!(err, CacheError::EncodingFailed { .. }));
        assert!(err.to_string().starts_with("snapshot encoding failed"));
    }
}
