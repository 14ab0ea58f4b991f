// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use seamcarve::{CarveOptions, SeamCarver, SearchPolicy};
use std::process;

extern crate clap;

use clap::{value_t, App, Arg, ArgGroup, ArgMatches};
use env_logger::Env;
use failure::Error;
use log::info;

fn app() -> App<'static, 'static> {
    App::new("seamcarve")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Content-aware image narrowing by seam carving")
        .arg(
            Arg::with_name("input")
                .help("The image to carve")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Where to write the carved image")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("seams")
                .help("How many seams to remove")
                .short("n")
                .long("seams")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("width")
                .help("Carve until the image is this wide")
                .short("w")
                .long("width")
                .takes_value(true),
        )
        .group(
            ArgGroup::with_name("amount")
                .args(&["seams", "width"])
                .required(true),
        )
        .arg(
            Arg::with_name("policy")
                .help("Seam search: backward or forward")
                .short("p")
                .long("policy")
                .takes_value(true)
                .default_value("forward"),
        )
        .arg(
            Arg::with_name("contiguous")
                .help("Recompute the whole image for every seam instead of updating around it")
                .long("contiguous"),
        )
        .arg(
            Arg::with_name("energy")
                .help("Also write a picture of the carved image's energy")
                .short("e")
                .long("energy")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Log more (repeat for more still)")
                .short("v")
                .multiple(true),
        )
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let policy: SearchPolicy = matches.value_of("policy").unwrap_or("forward").parse()?;
    let options = CarveOptions::default()
        .with_policy(policy)
        .with_incremental(!matches.is_present("contiguous"));

    let input = matches.value_of("input").unwrap_or_default();
    let output = matches.value_of("output").unwrap_or_default();

    let mut carver = SeamCarver::open(input, options)?;
    if matches.is_present("seams") {
        carver.carve(value_t!(matches, "seams", u32)?)?;
    } else {
        carver.carve_to_width(value_t!(matches, "width", u32)?)?;
    }
    info!(
        "{} is now {}x{}",
        input,
        carver.width(),
        carver.height()
    );

    carver.save(output)?;
    if let Some(energy) = matches.value_of("energy") {
        carver.save_energy(energy)?;
    }
    Ok(())
}

fn main() {
    let matches = app().get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(err) = run(&matches) {
        eprintln!("seamcarve: {}", err);
        process::exit(1);
    }
}
