use std::env;
use std::fs;
use std::path::PathBuf;

use foundation::time::TimeIndex;
use layers::{LayerPayload, PopupArgs, parse_payloads};
use tools::{expand_report, popup_reports, resolve_report};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "expand" => cmd_expand(args),
        "resolve" => cmd_resolve(args),
        "popup" => cmd_popup(args),
        _ => Err(usage()),
    }
}

fn cmd_expand(args: Vec<String>) -> Result<(), String> {
    // minicharts expand <payload.json>
    let [input] = args.as_slice() else {
        return Err(usage());
    };
    let payloads = read_payloads(&PathBuf::from(input))?;
    let out = expand_report(&payloads).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

fn cmd_resolve(args: Vec<String>) -> Result<(), String> {
    // minicharts resolve <payload.json> [--time N]
    let opts = parse_opts(args, false)?;
    let payloads = read_payloads(&opts.input)?;
    let out = resolve_report(&payloads, opts.time_id).map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}

fn cmd_popup(args: Vec<String>) -> Result<(), String> {
    // minicharts popup <payload.json> [--popup-args FILE] [--time N]
    let opts = parse_opts(args, true)?;
    let payloads = read_payloads(&opts.input)?;
    let popup_args = match &opts.popup_args {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            serde_json::from_str::<PopupArgs>(&text).map_err(|e| format!("parse {path:?}: {e}"))?
        }
        None => PopupArgs::default(),
    };

    let reports =
        popup_reports(&payloads, &popup_args, opts.time_id).map_err(|e| e.to_string())?;
    for report in reports {
        match report.html {
            Some(html) => println!("{}\t{html}", report.id),
            None => println!("{}\t-", report.id),
        }
    }
    Ok(())
}

struct Opts {
    input: PathBuf,
    popup_args: Option<PathBuf>,
    time_id: TimeIndex,
}

fn parse_opts(args: Vec<String>, allow_popup_args: bool) -> Result<Opts, String> {
    let mut input: Option<PathBuf> = None;
    let mut popup_args: Option<PathBuf> = None;
    let mut time_id = TimeIndex::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--time" => {
                i += 1;
                let raw = args.get(i).ok_or("--time requires a value")?;
                let n: usize = raw
                    .parse()
                    .map_err(|e| format!("--time {raw}: {e}"))?;
                time_id = TimeIndex::new(n);
            }
            "--popup-args" if allow_popup_args => {
                i += 1;
                let path = args.get(i).ok_or("--popup-args requires a value")?;
                popup_args = Some(PathBuf::from(path));
            }
            s if s.starts_with('-') => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
            s => {
                if input.replace(PathBuf::from(s)).is_some() {
                    return Err(format!("unexpected arg: {s}\n\n{}", usage()));
                }
            }
        }
        i += 1;
    }

    Ok(Opts {
        input: input.ok_or_else(usage)?,
        popup_args,
        time_id,
    })
}

fn read_payloads(path: &PathBuf) -> Result<Vec<LayerPayload>, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let payloads = parse_payloads(&text).map_err(|e| format!("{path:?}: {e}"))?;
    debug!(path = %path.display(), layers = payloads.len(), "payloads loaded");
    Ok(payloads)
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "minicharts".to_string());
    format!(
        "Usage:\n  {exe} expand <payload.json>\n  {exe} resolve <payload.json> [--time N]\n  {exe} popup <payload.json> [--popup-args FILE] [--time N]\n\nNotes:\n- A payload file is a JSON array of {{\"static\", \"dyn\", \"timeSteps\"}} objects.\n- `popup` prints one `<layer id>\\t<html>` line per layer; `-` means no popup.\n- Set RUST_LOG=debug for diagnostics on stderr.\n"
    )
}
