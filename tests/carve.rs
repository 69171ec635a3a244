use colorseam::{
    seamcarve, CarveConfig, CarveError, DirectorySink, DominantColor, MedianCut, Region,
};
use image::{GenericImageView, Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

struct Fixed {
    color: [u8; 3],
    calls: Cell<u32>,
    asked_for: RefCell<Option<PathBuf>>,
}

impl Fixed {
    fn new(color: [u8; 3]) -> Self {
        Fixed {
            color,
            calls: Cell::new(0),
            asked_for: RefCell::new(None),
        }
    }
}

impl DominantColor for Fixed {
    fn dominant_color(&self, source: &Path) -> colorseam::Result<[u8; 3]> {
        self.calls.set(self.calls.get() + 1);
        *self.asked_for.borrow_mut() = Some(source.to_path_buf());
        Ok(self.color)
    }
}

fn write_source(dir: &Path) -> PathBuf {
    let path = dir.join("source.png");
    RgbImage::from_fn(24, 12, |x, y| {
        if x > 8 && x < 14 {
            Rgb([220, 30, 30])
        } else {
            Rgb([((x * 7 + y * 5) % 64) as u8, 90, 140])
        }
    })
    .save(&path)
    .unwrap();
    path
}

#[test]
fn full_run_writes_every_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let out = dir.path().join("carved");
    let config = CarveConfig::new(6)
        .save_step(3)
        .red_line(true)
        .preserve(Region::new(9, 13, 0, 11))
        .extension("png");

    let mut sink = DirectorySink::new(&out);
    let (image, report) = seamcarve(&source, &config, &mut sink, &MedianCut::default()).unwrap();

    assert_eq!(image.dimensions(), (18, 12));
    assert_eq!(report.snapshots, 2);
    for name in &[
        "0th_original.png",
        "3th_carved_preserved.png",
        "6th_carved_preserved.png",
        "red_line/3th_red_line.png",
        "red_line/6th_red_line.png",
    ] {
        assert!(out.join(name).is_file(), "missing {}", name);
    }
    assert!(!out.join("1th_carved_preserved.png").exists());

    let third = image::open(out.join("3th_carved_preserved.png")).unwrap();
    assert_eq!(third.dimensions(), (21, 12));
    let marked = image::open(out.join("red_line/3th_red_line.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(marked.dimensions(), (22, 12));
    for y in 0..12 {
        let red = (0..22)
            .filter(|x| *marked.get_pixel(*x, y) == Rgb([255, 0, 0]))
            .count();
        assert_eq!(red, 1, "row {}", y);
    }
}

#[test]
fn preserved_band_is_intact_after_carving() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let config = CarveConfig::new(8)
        .preserve(Region::new(9, 13, 0, 11))
        .extension("png");
    let mut sink = DirectorySink::new(dir.path().join("carved"));
    let (image, _) = seamcarve(&source, &config, &mut sink, &MedianCut::default()).unwrap();

    let image = image.to_rgb8();
    for y in 0..12 {
        let band = (0..image.width())
            .filter(|x| *image.get_pixel(*x, y) == Rgb([220, 30, 30]))
            .count();
        assert_eq!(band, 5, "row {}", y);
    }
}

#[test]
fn dominant_color_is_asked_once_for_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let config = CarveConfig::new(4).dominant(true).extension("png");
    let colors = Fixed::new([20, 90, 140]);
    let mut sink = DirectorySink::new(dir.path().join("carved"));
    let (image, _) = seamcarve(&source, &config, &mut sink, &colors).unwrap();

    assert_eq!(image.dimensions(), (20, 12));
    assert_eq!(colors.calls.get(), 1);
    assert_eq!(colors.asked_for.borrow().as_deref(), Some(source.as_path()));
}

#[test]
fn grayscale_runs_never_ask_for_a_color() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let config = CarveConfig::new(2).color(false).extension("png");
    let colors = Fixed::new([0, 0, 0]);
    let mut sink = DirectorySink::new(dir.path().join("carved"));
    let (image, _) = seamcarve(&source, &config, &mut sink, &colors).unwrap();

    assert_eq!(image.color(), image::ColorType::L8);
    assert_eq!(image.dimensions(), (22, 12));
    assert_eq!(colors.calls.get(), 0);
}

#[test]
fn bad_configuration_fails_before_anything_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let out = dir.path().join("carved");
    let config = CarveConfig::new(3).preserve(Region::new(20, 30, 0, 4));
    let mut sink = DirectorySink::new(&out);

    match seamcarve(&source, &config, &mut sink, &MedianCut::default()) {
        Err(CarveError::Config(_)) => {}
        other => panic!("expected a configuration error, got {:?}", other.map(|(_, r)| r)),
    }
    assert!(!out.exists());
}

#[test]
fn existing_output_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let config = CarveConfig::new(1);
    let mut sink = DirectorySink::new(dir.path());

    match seamcarve(&source, &config, &mut sink, &MedianCut::default()) {
        Err(CarveError::Io { .. }) => {}
        other => panic!("expected an I/O error, got {:?}", other.map(|(_, r)| r)),
    }
}

#[test]
fn scaling_happens_before_validation() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    // Twelve seams fit the full 24 columns but not the 12 left at half scale.
    let config = CarveConfig::new(12).scale(0.5);
    let mut sink = DirectorySink::new(dir.path().join("carved"));

    match seamcarve(&source, &config, &mut sink, &MedianCut::default()) {
        Err(CarveError::TooManySeams { seams: 12, width: 12 }) => {}
        other => panic!("expected TooManySeams, got {:?}", other.map(|(_, r)| r)),
    }
}
