use colorseam::{
    calculate_energy, energy_to_image, load_image, seamcarve, CarveConfig, CarveError,
    DirectorySink, MedianCut, Region, SourceImage,
};
use std::path::Path;
use std::process;

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{value_t, App, Arg, ArgMatches};
use log::{error, info};

fn parse_region(spec: &str) -> Result<Region, CarveError> {
    let bounds = spec
        .split(',')
        .map(|v| v.trim().parse::<u32>())
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|e| CarveError::Config(format!("bad preserved region {:?}: {}", spec, e)))?;
    match bounds.as_slice() {
        [x1, x2, y1, y2] => Ok(Region::new(*x1, *x2, *y1, *y2)),
        _ => Err(CarveError::Config(format!(
            "a preserved region is four numbers, x1,x2,y1,y2, not {:?}",
            spec
        ))),
    }
}

fn build_config(matches: &ArgMatches) -> Result<CarveConfig, CarveError> {
    let iterations = value_t!(matches, "seams", u32).unwrap_or_else(|e| e.exit());
    let save_step = value_t!(matches, "save-step", u32).unwrap_or_else(|e| e.exit());
    let scale = value_t!(matches, "scale", f64).unwrap_or_else(|e| e.exit());
    let penalty = value_t!(matches, "penalty", f64).unwrap_or_else(|e| e.exit());
    let weight = value_t!(matches, "dominant-weight", f64).unwrap_or_else(|e| e.exit());

    let mut config = CarveConfig::new(iterations)
        .color(!matches.is_present("gray"))
        .red_line(matches.is_present("red-line"))
        .dominant(matches.is_present("dominant"))
        .save_step(save_step)
        .scale(scale)
        .preservation_penalty(penalty)
        .dominant_weight(weight)
        .extension(matches.value_of("format").unwrap_or("jpg"));
    if let Some(spec) = matches.value_of("preserve") {
        config = config.preserve(parse_region(spec)?);
    }
    Ok(config)
}

fn write_energy(source: &Path, config: &CarveConfig, target: &Path) -> Result<(), CarveError> {
    let image = load_image(source, config.is_color, config.scale)?;
    let (width, height) = image.dimensions();
    config.validate(width, height)?;
    let energy = match image {
        SourceImage::Gray(image) => calculate_energy(&image),
        SourceImage::Color(image) => calculate_energy(&image),
    };
    energy_to_image(&energy)
        .save(target)
        .map_err(|e| CarveError::Image {
            path: target.to_path_buf(),
            source: e,
        })?;
    info!("wrote energy map to {:?}", target);
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), CarveError> {
    let config = build_config(matches)?;
    config.validate_options()?;
    // Both positionals are required, so clap has already refused to
    // get this far without them.
    let source = Path::new(matches.value_of("image").unwrap_or_default());
    let output = matches.value_of("output").unwrap_or_default();

    if let Some(target) = matches.value_of("energy") {
        write_energy(source, &config, Path::new(target))?;
    }

    let mut sink = DirectorySink::new(output);
    let (_, report) = seamcarve(source, &config, &mut sink, &MedianCut::default())?;
    info!(
        "removed {} seams; {}x{} written to {:?} in {} snapshots",
        report.seams_removed,
        report.width,
        report.height,
        sink.root(),
        report.snapshots
    );
    Ok(())
}

fn main() {
    let matches = App::new("colorseam")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Content-aware width reduction by vertical seam carving")
        .arg(
            Arg::with_name("image")
                .help("The image to carve")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("A directory to create for the snapshots; must not exist")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("seams")
                .short("n")
                .long("seams")
                .takes_value(true)
                .default_value("10")
                .help("How many columns to remove"),
        )
        .arg(
            Arg::with_name("save-step")
                .short("s")
                .long("save-step")
                .takes_value(true)
                .default_value("1")
                .help("Write a snapshot every this many seams"),
        )
        .arg(
            Arg::with_name("scale")
                .long("scale")
                .takes_value(true)
                .default_value("1.0")
                .help("Resize the source by this factor before carving"),
        )
        .arg(
            Arg::with_name("gray")
                .short("g")
                .long("gray")
                .help("Carve a single-channel grayscale copy of the source"),
        )
        .arg(
            Arg::with_name("red-line")
                .short("r")
                .long("red-line")
                .help("Also write each snapshot's seam painted over the frame"),
        )
        .arg(
            Arg::with_name("preserve")
                .short("p")
                .long("preserve")
                .takes_value(true)
                .value_name("X1,X2,Y1,Y2")
                .help("Keep seams out of this inclusive rectangle where possible"),
        )
        .arg(
            Arg::with_name("dominant")
                .short("d")
                .long("dominant")
                .help("Steer seams by distance from the source's dominant color"),
        )
        .arg(
            Arg::with_name("penalty")
                .long("penalty")
                .takes_value(true)
                .default_value("1e10")
                .help("Energy added to preserved pixels"),
        )
        .arg(
            Arg::with_name("dominant-weight")
                .long("dominant-weight")
                .takes_value(true)
                .default_value("0.1")
                .help("Weight of dominant-color distance against energy"),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .takes_value(true)
                .default_value("jpg")
                .help("File extension, and so format, of the snapshots"),
        )
        .arg(
            Arg::with_name("energy")
                .long("energy")
                .takes_value(true)
                .value_name("FILE")
                .help("Write the source's energy map to this image file"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log every seam"),
        )
        .get_matches();

    let level = if matches.is_present("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&matches) {
        error!("{}", e);
        process::exit(1);
    }
}
