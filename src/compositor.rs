//! Region lifecycle plumbing for composing per-region map images.
//!
//! A traversal engine drives one [`RegionCompositor`] per run: for each
//! region it calls [`RegionCompositor::begin_region`], fills pixels through
//! the accessors, then calls [`RegionCompositor::end_region`] to write the
//! finished image to disk. Custom behavior plugs in through [`RegionHooks`].

use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::bmp_export;
use crate::region_image::RegionImage;

/// Customization points of the region lifecycle.
///
/// Every method has a default matching the standard behavior, so an
/// implementation overrides only what it needs. The hooks fire in a fixed
/// order: `begin_region` may veto the region after the erase hook ran;
/// `file_name`, `before_save` and `after_save` bracket the write, and
/// `after_save` is skipped when the write fails.
pub trait RegionHooks {
    /// Decide whether the region should be processed at all. Returning
    /// `false` tells the engine to skip the region's pixel writes and its
    /// `end_region` call.
    fn begin_region(&mut self, _region_x: i32, _region_z: i32) -> bool {
        true
    }

    /// Build the output file name for a finished region.
    fn file_name(&self, prefix: &str, region_x: i32, region_z: i32) -> PathBuf {
        PathBuf::from(format!("{}.{}.{}.bmp", prefix, region_x, region_z))
    }

    /// Erase the image at the start of a region. The default clears to black.
    fn erase_image(&mut self, image: &mut RegionImage) {
        image.erase(0);
    }

    /// Called just before the image is written to `file_name`.
    fn before_save(&mut self, _region_x: i32, _region_z: i32, _file_name: &Path) {}

    /// Called after the image was written. Not called when the write failed.
    fn after_save(&mut self, _region_x: i32, _region_z: i32, _file_name: &Path) {}
}

/// The all-defaults hook set: no veto, black erase, standard file names.
pub struct DefaultHooks;

impl RegionHooks for DefaultHooks {}

/// Composes one map image per region and saves it as a BMP file.
///
/// The engine must call `begin_region`, the pixel writes, and `end_region`
/// strictly sequentially for a given instance, one region at a time. The
/// pixel buffer is owned exclusively by the instance and reused across
/// regions without reallocation.
pub struct RegionCompositor {
    /// Prefix for the file names built by the default naming hook.
    file_name_prefix: String,
    /// Coords of the region currently being composed, if any.
    current_region: Option<(i32, i32)>,
    image: RegionImage,
    hooks: Box<dyn RegionHooks>,
}

impl RegionCompositor {
    /// Create a compositor with the default hooks.
    pub fn new(file_name_prefix: impl Into<String>) -> Self {
        Self::with_hooks(file_name_prefix, Box::new(DefaultHooks))
    }

    /// Create a compositor with custom hooks.
    pub fn with_hooks(file_name_prefix: impl Into<String>, hooks: Box<dyn RegionHooks>) -> Self {
        Self {
            file_name_prefix: file_name_prefix.into(),
            current_region: None,
            image: RegionImage::new(),
            hooks,
        }
    }

    /// Coords of the region currently being composed, or `None` before the
    /// first region starts.
    pub fn current_region(&self) -> Option<(i32, i32)> {
        self.current_region
    }

    /// Start composing a region: record its coords and erase the image
    /// through the erase hook. Returns `false` when the hooks veto the
    /// region; the engine must then skip its pixel writes and `end_region`.
    pub fn begin_region(&mut self, region_x: i32, region_z: i32) -> bool {
        self.current_region = Some((region_x, region_z));
        self.hooks.erase_image(&mut self.image);
        self.hooks.begin_region(region_x, region_z)
    }

    /// Finish a region: build the file name, run the before-save hook, write
    /// the image, run the after-save hook. A write failure is returned as-is
    /// and suppresses the after-save hook. Returns the written path.
    pub fn end_region(&mut self, region_x: i32, region_z: i32) -> io::Result<PathBuf> {
        debug_assert_eq!(self.current_region, Some((region_x, region_z)));

        let file_name = self
            .hooks
            .file_name(&self.file_name_prefix, region_x, region_z);
        self.hooks.before_save(region_x, region_z, &file_name);
        bmp_export::export_bmp(&self.image, &file_name)?;
        debug!("saved region ({}, {}) to {}", region_x, region_z, file_name.display());
        self.hooks.after_save(region_x, region_z, &file_name);
        Ok(file_name)
    }

    /// Set the pixel at the given UV coords; out-of-range writes are ignored.
    pub fn set_pixel(&mut self, u: i32, v: i32, color: i32) {
        self.image.set_pixel(u, v, color);
    }

    /// Get the pixel at the given UV coords; -1 if outside the image.
    pub fn get_pixel(&self, u: i32, v: i32) -> i32 {
        self.image.get_pixel(u, v)
    }

    /// Set a row of pixels starting at `(u_start, v)`. The caller guarantees
    /// the row fits inside the image.
    pub fn set_pixel_row(&mut self, u_start: usize, v: usize, pixels: &[i32]) {
        self.image.set_pixel_row(u_start, v, pixels);
    }

    /// Erase the entire image with the given color.
    pub fn erase_image(&mut self, color: i32) {
        self.image.erase(color);
    }

    /// Erase the given chunk's portion of the image. Chunk coords are
    /// relative to the current region.
    pub fn erase_chunk(&mut self, color: i32, rel_chunk_x: i32, rel_chunk_z: i32) {
        self.image.erase_chunk(color, rel_chunk_x, rel_chunk_z);
    }

    /// The image being composed.
    pub fn image(&self) -> &RegionImage {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::bmp_export::FILE_SIZE;

    #[test]
    fn test_region_scenario_produces_expected_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("map");
        let mut compositor = RegionCompositor::new(prefix.to_str().unwrap());

        assert!(compositor.begin_region(3, -2));
        assert_eq!(compositor.current_region(), Some((3, -2)));
        assert_eq!(compositor.get_pixel(100, 100), 0);

        compositor.set_pixel(0, 0, 0xFF0000);
        compositor.set_pixel(511, 511, 0x00FF00);

        let path = compositor.end_region(3, -2).unwrap();
        assert_eq!(path, dir.path().join("map.3.-2.bmp"));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), FILE_SIZE as u64);

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(0, 0).0, [0xFF, 0, 0]);
        assert_eq!(decoded.get_pixel(511, 511).0, [0, 0xFF, 0]);
        assert_eq!(decoded.get_pixel(256, 256).0, [0, 0, 0]);
    }

    #[test]
    fn test_begin_region_erases_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("map");
        let mut compositor = RegionCompositor::new(prefix.to_str().unwrap());

        assert!(compositor.begin_region(0, 0));
        compositor.set_pixel(10, 10, 0xABCDEF);
        compositor.end_region(0, 0).unwrap();

        assert!(compositor.begin_region(1, 0));
        assert_eq!(compositor.get_pixel(10, 10), 0);
    }

    struct VetoEmptyRegions;

    impl RegionHooks for VetoEmptyRegions {
        fn begin_region(&mut self, region_x: i32, region_z: i32) -> bool {
            region_x != 0 || region_z != 0
        }
    }

    #[test]
    fn test_hooks_can_veto_a_region() {
        let mut compositor = RegionCompositor::with_hooks("map", Box::new(VetoEmptyRegions));
        assert!(!compositor.begin_region(0, 0));
        assert!(compositor.begin_region(4, -1));
    }

    struct GrayErase;

    impl RegionHooks for GrayErase {
        fn erase_image(&mut self, image: &mut RegionImage) {
            image.erase(0x808080);
        }
    }

    #[test]
    fn test_custom_erase_hook_replaces_default() {
        let mut compositor = RegionCompositor::with_hooks("map", Box::new(GrayErase));
        assert!(compositor.begin_region(0, 0));
        assert_eq!(compositor.get_pixel(0, 0), 0x808080);
        assert_eq!(compositor.get_pixel(511, 511), 0x808080);
    }

    struct FlatNames {
        dir: PathBuf,
    }

    impl RegionHooks for FlatNames {
        fn file_name(&self, _prefix: &str, region_x: i32, region_z: i32) -> PathBuf {
            self.dir.join(format!("r{}x{}.bmp", region_x, region_z))
        }
    }

    #[test]
    fn test_custom_naming_hook_replaces_default() {
        let dir = tempfile::tempdir().unwrap();
        let hooks = FlatNames {
            dir: dir.path().to_path_buf(),
        };
        let mut compositor = RegionCompositor::with_hooks("unused", Box::new(hooks));

        assert!(compositor.begin_region(7, -3));
        let path = compositor.end_region(7, -3).unwrap();
        assert_eq!(path, dir.path().join("r7x-3.bmp"));
        assert!(path.exists());
    }

    #[derive(Default)]
    struct CallLog {
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl RegionHooks for CallLog {
        fn before_save(&mut self, _region_x: i32, _region_z: i32, _file_name: &Path) {
            self.calls.borrow_mut().push("before_save");
        }

        fn after_save(&mut self, _region_x: i32, _region_z: i32, _file_name: &Path) {
            self.calls.borrow_mut().push("after_save");
        }
    }

    #[test]
    fn test_save_hooks_bracket_a_successful_write() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("map");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let hooks = CallLog {
            calls: Rc::clone(&calls),
        };
        let mut compositor = RegionCompositor::with_hooks(prefix.to_str().unwrap(), Box::new(hooks));

        assert!(compositor.begin_region(0, 0));
        compositor.end_region(0, 0).unwrap();
        assert_eq!(*calls.borrow(), vec!["before_save", "after_save"]);
    }

    #[test]
    fn test_after_save_hook_skipped_on_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("no_such_dir").join("map");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let hooks = CallLog {
            calls: Rc::clone(&calls),
        };
        let mut compositor = RegionCompositor::with_hooks(prefix.to_str().unwrap(), Box::new(hooks));

        assert!(compositor.begin_region(0, 0));
        assert!(compositor.end_region(0, 0).is_err());
        assert_eq!(*calls.borrow(), vec!["before_save"]);
    }
}
