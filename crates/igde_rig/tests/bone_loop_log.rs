//! The bone loop diagnostic is logged once per matrix update.
//!
//! Kept in its own test binary because it installs a global logger.

use std::sync::atomic::{AtomicUsize, Ordering};

use igde_rig::prelude::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct LoopCounter;

static LOOP_ERRORS: AtomicUsize = AtomicUsize::new(0);
static LOGGER: LoopCounter = LoopCounter;

impl Log for LoopCounter {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Error
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Error
            && record.args().to_string() == "Bone loop detected while updating bone matrices"
        {
            LOOP_ERRORS.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flush(&self) {}
}

#[test]
fn test_loop_error_logged_once_per_update() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Error);

    let mut rig = Rig::new();
    let a = rig.add_bone(RigBone::new("a")).unwrap();
    let b = rig.add_bone(RigBone::new("b").with_parent(a)).unwrap();
    let _c = rig.add_bone(RigBone::new("c").with_parent(b)).unwrap();
    assert_eq!(LOOP_ERRORS.load(Ordering::SeqCst), 0);

    rig.set_bone_parent(a, Some(b)).unwrap();
    let before = LOOP_ERRORS.load(Ordering::SeqCst);
    rig.update_bone_matrices();
    assert_eq!(LOOP_ERRORS.load(Ordering::SeqCst), before + 1);
    rig.update_bone_matrices();
    assert_eq!(LOOP_ERRORS.load(Ordering::SeqCst), before + 2);
}
