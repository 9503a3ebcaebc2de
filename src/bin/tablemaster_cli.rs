//! CLI tool for tablemaster - renders widget settings to HTML
//!
//! Usage:
//!   tablemaster_cli table <settings.json> [--uploads DIR] [--trusted-text] [-o out.html]
//!   tablemaster_cli nav <settings.json> [--trusted-text] [-o out.html]
//!   tablemaster_cli grid <input.xlsx> [-o out.json]
//!
//! Uploaded files are looked up below `--uploads`, which defaults to the
//! directory holding the settings file. Set `RUST_LOG=debug` to see why a
//! table rendered empty.

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tablemaster::{
    parser, NavListRenderer, NavSettings, RenderOptions, TableRenderer, TableSettings,
    UploadsDirResolver,
};

const USAGE: &str = "Usage:
  tablemaster_cli table <settings.json> [--uploads DIR] [--trusted-text] [-o out.html]
  tablemaster_cli nav <settings.json> [--trusted-text] [-o out.html]
  tablemaster_cli grid <input.xlsx> [-o out.json]";

#[derive(Debug, Default)]
struct Args {
    command: String,
    input: PathBuf,
    output: Option<PathBuf>,
    uploads: Option<PathBuf>,
    trusted_text: bool,
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn parse_args() -> Args {
    let mut raw = env::args().skip(1);
    let mut args = Args {
        command: raw.next().unwrap_or_default(),
        ..Args::default()
    };

    let mut input = None;
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-o" | "--output" => match raw.next() {
                Some(path) => args.output = Some(PathBuf::from(path)),
                None => fail("-o needs a file path"),
            },
            "--uploads" => match raw.next() {
                Some(dir) => args.uploads = Some(PathBuf::from(dir)),
                None => fail("--uploads needs a directory"),
            },
            "--trusted-text" => args.trusted_text = true,
            _ if input.is_none() => input = Some(PathBuf::from(&arg)),
            _ => fail(&format!("Unexpected argument: {arg}\n{USAGE}")),
        }
    }

    match input {
        Some(path) => args.input = path,
        None => fail(USAGE),
    }
    args
}

fn read_to_string(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error reading {}: {}", path.display(), e)),
    }
}

fn options(args: &Args) -> RenderOptions {
    if args.trusted_text {
        RenderOptions::trusted()
    } else {
        RenderOptions::default()
    }
}

fn render_table(args: &Args) -> String {
    let settings = match TableSettings::from_json(&read_to_string(&args.input)) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error in {}: {}", args.input.display(), e)),
    };

    let root = args.uploads.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let resolver = UploadsDirResolver::new(root);

    TableRenderer::default()
        .with_options(options(args))
        .render(&settings.into_source(&resolver))
}

fn render_nav(args: &Args) -> String {
    let settings = match NavSettings::from_json(&read_to_string(&args.input)) {
        Ok(s) => s,
        Err(e) => fail(&format!("Error in {}: {}", args.input.display(), e)),
    };

    NavListRenderer::new()
        .with_options(options(args))
        .render(&settings.into_list())
}

fn dump_grid(args: &Args) -> String {
    let grid = match parser::parse_file(&args.input) {
        Ok(g) => g,
        Err(e) => fail(&format!("Error parsing {}: {}", args.input.display(), e)),
    };

    match serde_json::to_string_pretty(&grid) {
        Ok(j) => j,
        Err(e) => fail(&format!("Error serializing JSON: {e}")),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args();
    let rendered = match args.command.as_str() {
        "table" => render_table(&args),
        "nav" => render_nav(&args),
        "grid" => dump_grid(&args),
        other => fail(&format!("Unknown command: {other:?}\n{USAGE}")),
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered) {
                fail(&format!("Error writing {}: {}", path.display(), e));
            }
            eprintln!("Written: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| writeln!(stdout))
            {
                fail(&format!("Error writing output: {e}"));
            }
        }
    }
}
