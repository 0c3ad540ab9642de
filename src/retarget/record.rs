//! Persisted bone record.
//!
//! A bone keeps its index and rest pose in node user properties so a later
//! import can restore the pose the scene was authored with. The record is
//! read through a static field table; any missing or unparsable field marks
//! the whole record as corrupted and the caller repairs it from the live
//! hierarchy.

use glam::{Affine3A, Vec3};

use crate::scene::UserProps;

/// User property carrying the bone index.
pub const BONE_INDEX_KEY: &str = "LMTBone";

/// Index of a bone explicitly left unbound.
pub const UNBOUND: i32 = -1;
/// Index of a synthesized scale handle.
pub const SCALE_HANDLE: i32 = -2;
/// Index written by broken exporters; repaired to [`UNBOUND`] on scan.
pub const CORRUPTED: i32 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Index,
    Row(usize),
}

/// Field name to typed slot. The order is the write-back order.
const FIELDS: [(&str, Field); 5] = [
    (BONE_INDEX_KEY, Field::Index),
    ("r1", Field::Row(0)),
    ("r2", Field::Row(1)),
    ("r3", Field::Row(2)),
    ("r4", Field::Row(3)),
];

/// Names of the four rest-pose rows.
pub const ROW_KEYS: [&str; 4] = ["r1", "r2", "r3", "r4"];

/// Bone index plus rest pose, as stored on a node.
///
/// Rows follow the host's row-vector layout: three basis rows followed by
/// the translation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneRecord {
    pub index: i32,
    pub rows: [Vec3; 4],
}

impl Default for BoneRecord {
    fn default() -> Self {
        Self {
            index: CORRUPTED,
            rows: [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ZERO],
        }
    }
}

/// Outcome of reading a record.
///
/// A corrupted record still carries whatever fields could be read; its
/// rest pose must be recaptured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PersistedRecord {
    Valid(BoneRecord),
    Corrupted(BoneRecord),
}

impl PersistedRecord {
    #[must_use]
    pub fn record(&self) -> &BoneRecord {
        match self {
            Self::Valid(r) | Self::Corrupted(r) => r,
        }
    }

    #[must_use]
    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Corrupted(_))
    }
}

impl BoneRecord {
    /// Reads the record from node properties.
    ///
    /// A missing field stops the read. An empty or unparsable field is
    /// skipped and the rest are still read. An unreadable index reads as
    /// [`CORRUPTED`].
    #[must_use]
    pub fn read(props: &UserProps) -> PersistedRecord {
        let mut record = Self::default();
        let mut corrupted = false;

        for (key, field) in FIELDS {
            let Some(raw) = props.get_string(key) else {
                corrupted = true;
                break;
            };

            match field {
                Field::Index => match raw.trim().parse::<i32>() {
                    Ok(v) => record.index = v,
                    Err(_) => corrupted = true,
                },
                Field::Row(r) => match parse_row(raw) {
                    Some(v) => record.rows[r] = v,
                    None => corrupted = true,
                },
            }
        }

        if corrupted {
            PersistedRecord::Corrupted(record)
        } else {
            PersistedRecord::Valid(record)
        }
    }

    /// Writes every field back to node properties.
    pub fn write(&self, props: &mut UserProps) {
        for (key, field) in FIELDS {
            match field {
                Field::Index => props.set_int(key, self.index),
                Field::Row(r) => props.set_string(key, format_row(self.rows[r])),
            }
        }
    }

    #[must_use]
    pub fn rest_pose(&self) -> Affine3A {
        let [x, y, z, w] = self.rows;
        Affine3A::from_cols(x.into(), y.into(), z.into(), w.into())
    }

    pub fn set_rest_pose(&mut self, pose: &Affine3A) {
        self.rows = [
            pose.matrix3.x_axis.into(),
            pose.matrix3.y_axis.into(),
            pose.matrix3.z_axis.into(),
            pose.translation.into(),
        ];
    }
}

fn parse_row(raw: &str) -> Option<Vec3> {
    let mut parts = raw.split(',').map(|p| p.trim().parse::<f32>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Vec3::new(x, y, z))
}

// `Display` for f32 is the shortest string that parses back to the same
// value, so rows survive a write/read cycle exactly.
fn format_row(v: Vec3) -> String {
    format!("{}, {}, {}", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn valid_props() -> UserProps {
        let mut props = UserProps::new();
        props.set_int(BONE_INDEX_KEY, 4);
        props.set_string("r1", "1, 0, 0");
        props.set_string("r2", "0, 1, 0");
        props.set_string("r3", "0, 0, 1");
        props.set_string("r4", "0, 10, 0");
        props
    }

    #[test]
    fn reads_complete_record() {
        let rec = BoneRecord::read(&valid_props());
        assert!(!rec.is_corrupted());
        assert_eq!(rec.record().index, 4);
        assert_eq!(rec.record().rows[3], Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn missing_row_is_corrupted() {
        let mut props = valid_props();
        props.remove("r3");
        assert!(BoneRecord::read(&props).is_corrupted());
    }

    #[test]
    fn empty_row_is_corrupted_but_index_survives() {
        let mut props = valid_props();
        props.set_string("r2", "");
        let rec = BoneRecord::read(&props);
        assert!(rec.is_corrupted());
        assert_eq!(rec.record().index, 4);
    }

    #[test]
    fn unparsable_index_reads_as_sentinel() {
        let mut props = valid_props();
        props.set_string(BONE_INDEX_KEY, "bone");
        let rec = BoneRecord::read(&props);
        assert!(rec.is_corrupted());
        assert_eq!(rec.record().index, CORRUPTED);
    }

    #[test]
    fn rest_pose_survives_properties() {
        let pose = Affine3A::from_scale_rotation_translation(
            Vec3::new(1.0, 1.5, 0.75),
            Quat::from_rotation_y(0.3),
            Vec3::new(0.1, -2.0, 7.25),
        );
        let mut rec = BoneRecord {
            index: 2,
            ..Default::default()
        };
        rec.set_rest_pose(&pose);

        let mut props = UserProps::new();
        rec.write(&mut props);
        let back = BoneRecord::read(&props);

        assert_eq!(back, PersistedRecord::Valid(rec));
        assert_eq!(back.record().rest_pose(), rec.rest_pose());
    }
}
