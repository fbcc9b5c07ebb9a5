use acc16_compiler::backend::encoder::to_words;
use acc16_compiler::{compile_with, run, CompileOptions, SimConfig};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "acc16c")]
#[command(about = "A compiler for the acc16 six-register machine")]
struct Args {
    /// Path to the source file to compile (a built-in sample is used if omitted)
    file: Option<PathBuf>,

    /// Emit IR. If none of --ir/--asm/--words is given, defaults to --asm.
    #[arg(long)]
    ir: bool,

    /// Emit assembly
    #[arg(long)]
    asm: bool,

    /// Emit the encoded word stream (opcode, immediate per instruction)
    #[arg(long)]
    words: bool,

    /// Run the program on the simulator and print everything written to IO
    #[arg(long)]
    run: bool,

    /// Print the requested artifacts as one JSON object
    #[arg(long)]
    json: bool,

    /// Reject `var` declarations of names that already exist
    #[arg(long)]
    strict_redeclare: bool,

    /// Simulator step limit
    #[arg(long, default_value_t = SimConfig::default().max_steps)]
    max_steps: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize, Default)]
struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    ir: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asm: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<Vec<u16>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<Vec<u16>>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let src = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Error reading file '{}'", path.display()))?,
        None => DEFAULT_SAMPLE.trim().to_string(),
    };

    let want_asm = args.asm || !(args.ir || args.words || args.run);
    let options = if args.strict_redeclare {
        CompileOptions::strict()
    } else {
        CompileOptions::default()
    };

    let compiled = compile_with(&src, &options).context("Compilation failed")?;

    let mut snapshot = Snapshot::default();
    if args.ir {
        snapshot.ir = Some(compiled.ir.to_lines());
    }
    if want_asm {
        snapshot.asm = Some(compiled.lowered.to_lines());
    }
    if args.words {
        snapshot.words = Some(to_words(&compiled.encoded));
    }
    if args.run {
        let config = SimConfig {
            max_steps: args.max_steps,
        };
        let machine = run(&compiled.encoded, &config).context("Execution failed")?;
        log::info!("program finished after {} steps", machine.steps());
        snapshot.output = Some(machine.output().to_vec());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_text(&snapshot);
    }
    Ok(())
}

fn print_text(snapshot: &Snapshot) {
    let mut sections = 0;
    let mut section = |title: &str, lines: &[String]| {
        if sections > 0 {
            println!();
        }
        sections += 1;
        println!("; {title}");
        for line in lines {
            println!("{line}");
        }
    };

    if let Some(ir) = &snapshot.ir {
        section("ir", ir);
    }
    if let Some(asm) = &snapshot.asm {
        section("asm", asm);
    }
    if let Some(words) = &snapshot.words {
        let lines: Vec<String> = words
            .chunks(2)
            .map(|pair| pair.iter().map(|w| format!("{w:04x}")).collect::<Vec<_>>().join(" "))
            .collect();
        section("words", &lines);
    }
    if let Some(output) = &snapshot.output {
        let lines: Vec<String> = output.iter().map(|v| v.to_string()).collect();
        section("output", &lines);
    }
}

const DEFAULT_SAMPLE: &str = r#"
var x = 5;
var y = 10;
if x < y: {
    var z = x + y;
} else {
    var z = x - y;
}

while z > 0: {
    print z;
    var z = z - 4;
}
var result = z % 3 + 100;
print result;
"#;
