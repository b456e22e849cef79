use std::process;

use anyhow::{Context, Result};
use log::*;

use fsprobe::cli::{parse_args, Command, Invocation, USAGE};
use fsprobe::limits::check_descriptor_budget;
use fsprobe::progress::LineRedraw;
use fsprobe::report::banner;
use fsprobe::{CloseMode, Harness, MountTarget};

fn main() {
    env_logger::init();

    let invocation = match parse_args(std::env::args_os().skip(1)) {
        Ok(Command::Run(invocation)) => invocation,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    if let Err(err) = run(&invocation) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(invocation: &Invocation) -> Result<()> {
    let mount = &invocation.mount;
    let mut harness = Harness::new(MountTarget, invocation.resolve()?, LineRedraw::stdout());
    let config = harness.config();
    debug!("effective config: {config:?}");

    println!("{}", banner(config.test_count));
    if config.close_mode == CloseMode::Stress {
        check_descriptor_budget(config);
    }

    let mut cases = harness.generate(mount)?;
    let report = harness
        .run(&mut cases)
        .with_context(|| format!("probe of {} aborted", mount.display()))?;

    println!("{report}");
    if invocation.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
