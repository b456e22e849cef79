use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};

use fsprobe::config::BLOCK_SIZE;
use fsprobe::progress::Quiet;
use fsprobe::{CloseMode, Harness, MountTarget, ProbeConfig};

fn main() {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let (Some(mount), None) = (args.next(), args.next()) else {
        eprintln!("Usage: fsprobe-once <mount>");
        process::exit(1);
    };

    if let Err(err) = run(PathBuf::from(mount)) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(mount: PathBuf) -> Result<()> {
    let config = ProbeConfig {
        block_size: BLOCK_SIZE,
        block_count: 1,
        test_count: 1,
        close_mode: CloseMode::Simple,
        ..ProbeConfig::default()
    };
    let mut harness = Harness::new(MountTarget, config, Quiet);
    let mut cases = harness.generate(&mount)?;
    let case = &cases[0];

    println!("File is : {}", case.path.display());
    println!("First offset {}", case.first_offset);
    println!("Second offset {}", case.second_offset);
    println!("Buffer len: {}", case.payload.len());

    harness
        .run(&mut cases)
        .with_context(|| format!("probe of {} aborted", mount.display()))?;

    let case = &cases[0];
    println!("{}", case.payload.len());
    println!("{}", case.read_len.unwrap_or(0));
    if case.outcome.is_match() {
        println!("NICE! :)");
    } else {
        println!("MEH! :(");
    }
    Ok(())
}
