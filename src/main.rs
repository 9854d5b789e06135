use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use sm83_core::cartridge::Cartridge;
use sm83_core::disasm::Disassembler;
use sm83emu::config::{self, RunnerConfig};
use sm83emu::runner::{self, Outcome};

const ENTRY_POINT: u16 = 0x0100;

#[derive(Parser)]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Runner settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to boot ROM file
    #[arg(long)]
    bootrom: Option<PathBuf>,

    /// Give up after this many machine cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Keep running after the ROM reports a verdict
    #[arg(long)]
    no_stop: bool,

    /// Print the first N instructions from the entry point and exit
    #[arg(long, value_name = "N")]
    disassemble: Option<usize>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn runner_config(&self) -> RunnerConfig {
        let mut cfg = self
            .config
            .as_deref()
            .map(config::load_from_file)
            .unwrap_or_default();
        if let Some(max) = self.max_cycles {
            cfg.max_cycles = max;
        }
        if let Some(path) = &self.bootrom {
            cfg.boot_rom = Some(path.clone());
        }
        if self.no_stop {
            cfg.stop_on_result = false;
        }
        cfg
    }
}

fn disassemble(args: &Args, count: usize) -> ExitCode {
    let cart = match Cartridge::from_file(&args.rom) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let code = cart.rom().get(ENTRY_POINT as usize..).unwrap_or_default();
    for line in Disassembler::with_base(code, ENTRY_POINT).lines().take(count) {
        println!("{line}");
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(count) = args.disassemble {
        return disassemble(&args, count);
    }

    let cfg = args.runner_config();
    let report =
        runner::build_machine(&args.rom, &cfg).and_then(|mut gb| runner::run(&mut gb, &cfg));
    match report {
        Ok(report) => {
            println!("{}", report.serial_text());
            match report.outcome {
                Outcome::Passed => ExitCode::SUCCESS,
                Outcome::Failed => ExitCode::from(1),
                Outcome::Timeout => ExitCode::from(2),
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
