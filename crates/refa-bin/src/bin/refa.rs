use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use refa::pattern_def::{parse_pattern_defs, push_pattern_def, PatternDef};
use refa::{compile, ExportedAutomaton};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Stage {
    Nfa,
    Dfa,
    Minimized,
}

/// Compile regular expressions into minimal DFAs
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Regexes to compile
    patterns: Vec<String>,

    /// File with one `name: pattern` (or bare pattern) per line
    #[arg(short, long)]
    defs: Option<PathBuf>,

    /// Which automaton to print
    #[arg(short, long, value_enum, default_value_t = Stage::Minimized)]
    stage: Stage,

    /// Directory to write serialized automata into
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn write_export(dir: &Path, file_name: String, exported: &ExportedAutomaton) -> anyhow::Result<()> {
    let path = dir.join(file_name);
    let bytes = exported.to_bytes()?;
    fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {}, {} bytes", path.display(), bytes.len());
    Ok(())
}

fn run(def: &PatternDef, args: &Args) -> anyhow::Result<()> {
    let compiled = compile(&def.pattern)?;

    let printed = match args.stage {
        Stage::Nfa => compiled.nfa.export(),
        Stage::Dfa => compiled.dfa.export(),
        Stage::Minimized => compiled.minimized.export(),
    };
    println!("{} = {}", def.name, def.pattern);
    println!("{}", printed);

    if let Some(dir) = &args.output {
        write_export(dir, format!("{}_nfa.bin", def.name), &compiled.nfa.export())?;
        write_export(dir, format!("{}_dfa.bin", def.name), &compiled.dfa.export())?;
        write_export(dir, format!("{}_min.bin", def.name), &compiled.minimized.export())?;
    }

    Ok(())
}

// definitions from --defs first, then the positional patterns
fn collect_defs(args: &Args) -> anyhow::Result<Vec<PatternDef>> {
    let mut defs: Vec<PatternDef> = Vec::new();
    if let Some(path) = &args.defs {
        let def_string = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        defs.extend(parse_pattern_defs(&def_string));
    }
    for pattern in &args.patterns {
        push_pattern_def(&mut defs, None, pattern);
    }

    if defs.is_empty() {
        bail!("no regexes given, pass them as arguments or with --defs");
    }

    Ok(defs)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let defs = collect_defs(&args)?;

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    // every regex is independent, one failing does not stop the rest
    let mut failed = 0;
    for def in &defs {
        if let Err(e) = run(def, &args) {
            log::error!("{} ('{}'): {:#}", def.name, def.pattern, e);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} regexes failed", failed, defs.len());
    }

    Ok(())
}
