use sml::computer::{Machine, DEFAULT_REGISTERS};

use std::path::PathBuf;

use clap::Parser;
use eyre::{bail, Result, WrapErr};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sml")]
#[command(about = "Translate and run an SML program")]
struct Cli {
    /// Path to the program source
    program: PathBuf,

    /// Number of registers in the machine
    #[arg(short, long, default_value_t = DEFAULT_REGISTERS)]
    registers: usize,

    /// Print the translated program before running it
    #[arg(short, long)]
    list: bool,

    /// Print every register once the program halts
    #[arg(short, long)]
    dump_registers: bool,

    /// Refuse to run if any line failed to translate
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "sml=warn",
        1 => "sml=info",
        _ => "sml=debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.registers == 0 {
        bail!("the machine needs at least one register");
    }

    let mut machine = Machine::with_registers(cli.registers);

    let report = machine
        .load_file(&cli.program)
        .wrap_err("failed to load program")?;

    if cli.strict && !report.is_clean() {
        bail!(
            "{} line(s) of {} failed to translate",
            report.errors.len(),
            cli.program.display()
        );
    }

    if cli.list {
        eprintln!("program ({} instructions):", machine.program().len());
        eprint!("{machine}");
    }

    machine.run().wrap_err_with(|| {
        format!("{} halted on a fault", cli.program.display())
    })?;

    if cli.dump_registers {
        eprintln!("registers:");
        eprintln!("{}", machine.registers());
    }

    Ok(())
}
