use std::path::Path;

use crate::config::{ImportSettings, MotionSelection};
use crate::errors::{Result, RetargetError};
use crate::motion::{MotionAsset, MotionClip, MotionReader};
use crate::retarget::applier::TrackApplier;
use crate::retarget::compensator::compensate;
use crate::retarget::handles::ScaleHandleTree;
use crate::retarget::registry::BoneRegistry;
use crate::retarget::report::{ImportReport, MotionRange};
use crate::retarget::schedule::FrameSchedule;
use crate::scene::{NodeHandle, Scene};
use crate::time::TimeValue;

/// Import context: the target scene, the settings and the bone registry
/// built for this import.
///
/// ```rust,ignore
/// let mut importer = MotionImporter::new(&mut scene, settings)?;
/// importer.import_asset(&asset)?;
/// let report = importer.finish();
/// ```
pub struct MotionImporter<'a> {
    scene: &'a mut Scene,
    settings: ImportSettings,
    registry: BoneRegistry,
    report: ImportReport,
}

impl<'a> MotionImporter<'a> {
    /// Validates `settings` and scans the scene for bones.
    pub fn new(scene: &'a mut Scene, settings: ImportSettings) -> Result<Self> {
        settings.validate()?;
        let registry = BoneRegistry::scan(scene);
        Ok(Self {
            scene,
            settings,
            registry,
            report: ImportReport::default(),
        })
    }

    #[must_use]
    pub fn registry(&self) -> &BoneRegistry {
        &self.registry
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    #[must_use]
    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    /// Imports one motion starting at tick `start` and returns the tick the
    /// next motion should start at.
    ///
    /// Existing keys are not cleared here; run
    /// [`BoneRegistry::reset_animation_channels`] first (as
    /// [`import_asset`](Self::import_asset) does) for repeatable results.
    pub fn import_motion(&mut self, clip: &MotionClip, start: TimeValue) -> TimeValue {
        let schedule = FrameSchedule::new(
            clip.num_frames,
            self.settings.frame_rate(),
            self.scene.frame_rate(),
            start,
        );

        // 1. Split scaled bones
        let scale_tracks: Vec<(NodeHandle, usize)> = clip
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.track_type.is_scale())
            .filter_map(|(i, t)| self.registry.lookup_node(t.bone_id).map(|n| (n, i)))
            .collect();
        let mut tree = ScaleHandleTree::plan(self.scene, &scale_tracks);
        self.report.handles_created += tree.apply(self.scene);

        // 2. Pick up new handles and settle the rest pose
        self.registry.rescan(self.scene);
        self.registry.restore_pose(self.scene, start);

        // 3. Position and rotation
        let applier = TrackApplier::new(&schedule, self.settings.unit_scale);
        let diagnostics = applier.apply(self.scene, &self.registry, clip, &tree);
        self.report.diagnostics.extend(diagnostics);

        // 4. Scale and the translations it affects
        tree.populate_scale(self.scene, clip, &schedule);
        compensate(self.scene, &tree, &schedule);

        self.scene.set_anim_range(schedule.anim_range());
        schedule.next_start()
    }

    /// Imports the motions picked by the settings' selection.
    ///
    /// A selection that points at a missing or empty slot fails before any
    /// key or hierarchy change. With [`MotionSelection::All`] every filled slot is
    /// imported back-to-back and the pose is locked at the end of each
    /// motion.
    pub fn import_asset(&mut self, asset: &MotionAsset) -> Result<()> {
        check_selection(self.settings.selection, asset)?;

        self.registry.rescan(self.scene);
        self.registry.reset_animation_channels(self.scene);

        if !self.settings.resample() {
            self.scene.set_frame_rate(self.settings.frame_rate());
        }

        match self.settings.selection {
            MotionSelection::Single(index) => {
                if let Some(clip) = asset.motion(index) {
                    self.import_slot(index, clip, 0);
                }
            }
            MotionSelection::All => {
                let names = asset.motion_names();
                let mut last = 0;
                log::info!("Dumping animation ranges:");

                for (index, slot) in asset.iter().enumerate() {
                    let Some(clip) = slot else { continue };
                    let next = self.import_slot(index, clip, last);
                    log::info!("{}: {last}, {next}", names[index]);
                    last = next;

                    let tpf = self.scene.ticks_per_frame();
                    self.registry.lock_pose(self.scene, next - tpf);
                }
            }
        }

        self.registry.rescan(self.scene);
        let tpf = self.scene.ticks_per_frame();
        self.registry.restore_pose(self.scene, -tpf);
        Ok(())
    }

    fn import_slot(&mut self, index: usize, clip: &MotionClip, start: TimeValue) -> TimeValue {
        let next_start = self.import_motion(clip, start);
        self.report.ranges.push(MotionRange {
            motion: index,
            range: self.scene.anim_range(),
            next_start,
        });
        next_start
    }

    #[must_use]
    pub fn finish(self) -> ImportReport {
        self.report
    }
}

/// Loads a motion asset through `reader` and imports it into `scene`.
///
/// Loading and validation happen before any scene mutation.
pub fn import_file(
    scene: &mut Scene,
    path: impl AsRef<Path>,
    settings: ImportSettings,
    reader: &dyn MotionReader,
) -> Result<ImportReport> {
    settings.validate()?;
    let asset = reader.read(path.as_ref())?;
    check_selection(settings.selection, &asset)?;

    let mut importer = MotionImporter::new(scene, settings)?;
    importer.import_asset(&asset)?;
    Ok(importer.finish())
}

fn check_selection(selection: MotionSelection, asset: &MotionAsset) -> Result<()> {
    let MotionSelection::Single(index) = selection else {
        return Ok(());
    };
    if index >= asset.len() {
        return Err(RetargetError::MotionOutOfRange {
            index,
            count: asset.len(),
        });
    }
    if asset.motion(index).is_none() {
        return Err(RetargetError::EmptyMotion { index });
    }
    Ok(())
}
