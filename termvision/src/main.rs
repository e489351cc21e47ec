//! Entry point for the termvision TUI. Parses args, resolves the profile and runs the App.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use termvision::app::App;
use termvision::config::{
    load_profiles, parse_interval_ms, save_profiles, ClientConfig, ProfileRequest, ResolveProfile,
};
use termvision::logging::init_logging;
use termvision::ws::parse_endpoint;

const USAGE: &str = "[--tls-ca CERT_PEM|-t CERT_PEM] [--profile NAME|-P NAME] [--save] [--interval MS|-i MS] [--log-file PATH] [--dry-run] [wss://HOST:PORT/ws]";

struct ParsedArgs {
    url: Option<String>,
    tls_ca: Option<String>,
    profile: Option<String>,
    interval: Option<Duration>,
    log_file: Option<PathBuf>,
    save: bool,
    dry_run: bool,
}

enum ArgsError {
    Help(String),
    Usage(String),
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, ArgsError> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "termvision".into());
    let usage = |why: &str| ArgsError::Usage(format!("{why}. Usage: {prog} {USAGE}"));
    let mut url: Option<String> = None;
    let mut tls_ca: Option<String> = None;
    let mut profile: Option<String> = None;
    let mut interval: Option<Duration> = None;
    let mut log_file: Option<PathBuf> = None;
    let mut save = false; // --save
    let mut dry_run = false; // --dry-run
    let mut help = false;

    while let Some(arg) = it.next() {
        // --flag=value forms
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        match flag.as_str() {
            "-h" | "--help" => help = true,
            "--tls-ca" | "-t" => tls_ca = inline.or_else(|| it.next()).filter(|v| !v.is_empty()),
            "--profile" | "-P" => profile = inline.or_else(|| it.next()).filter(|v| !v.is_empty()),
            "--log-file" => log_file = inline.or_else(|| it.next()).map(PathBuf::from),
            "--interval" | "-i" => {
                let raw = inline.or_else(|| it.next()).unwrap_or_default();
                match parse_interval_ms(&raw) {
                    Some(d) => interval = Some(d),
                    None => return Err(usage(&format!("Invalid interval `{raw}` (milliseconds, > 0)"))),
                }
            }
            "--save" => save = true,
            "--dry-run" => dry_run = true,
            _ if flag.starts_with('-') => return Err(usage(&format!("Unknown option `{flag}`"))),
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(usage("Unexpected argument"));
                }
            }
        }
    }
    if help {
        return Err(ArgsError::Help(format!("Usage: {prog} {USAGE}")));
    }
    Ok(ParsedArgs {
        url,
        tls_ca,
        profile,
        interval,
        log_file,
        save,
        dry_run,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(ArgsError::Help(msg)) => {
            println!("{msg}");
            return Ok(());
        }
        Err(ArgsError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        tls_ca: parsed.tls_ca.clone(),
        poll_interval: parsed.interval,
    };

    // Determine final connection parameters (and maybe mutated profiles to persist)
    let mut profiles_mut = profiles_file.clone();
    let config: ClientConfig = match req.resolve(&profiles_file) {
        ResolveProfile::Direct(cfg) => {
            if let Some(name) = parsed.profile.as_ref() {
                let entry = cfg.to_entry();
                match profiles_mut.profiles.get(name) {
                    None => {
                        // New profile: auto-save immediately
                        profiles_mut.profiles.insert(name.clone(), entry);
                        save_profiles(&profiles_mut)?;
                    }
                    Some(existing) if *existing != entry => {
                        let overwrite = parsed.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "));
                        if overwrite {
                            profiles_mut.profiles.insert(name.clone(), entry);
                            save_profiles(&profiles_mut)?;
                        }
                    }
                    Some(_) => {}
                }
            }
            cfg
        }
        ResolveProfile::Loaded(cfg) | ResolveProfile::Default(cfg) => cfg,
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
                .and_then(|name| profiles_mut.profiles.get(name));
            match picked {
                Some(entry) => {
                    let mut cfg = ClientConfig::from_entry(entry);
                    if let Some(p) = parsed.interval {
                        cfg.poll_interval = p;
                    }
                    cfg
                }
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (ws://HOST:PORT/ws or wss://...): ")?;
            if url.trim().is_empty() {
                return Ok(());
            }
            let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
            let cfg = ClientConfig {
                url: url.trim().to_string(),
                tls_ca: parsed
                    .tls_ca
                    .clone()
                    .or_else(|| Some(ca.trim().to_string()).filter(|c| !c.is_empty())),
                poll_interval: parsed.interval.unwrap_or(ClientConfig::default().poll_interval),
                ..ClientConfig::default()
            };
            profiles_mut.profiles.insert(name, cfg.to_entry());
            save_profiles(&profiles_mut)?;
            cfg
        }
    };

    if let Err(e) = parse_endpoint(&config.url) {
        eprintln!("{e}");
        std::process::exit(2);
    }

    if parsed.dry_run {
        println!(
            "url={} tls_ca={} interval_ms={}",
            config.url,
            config.tls_ca.as_deref().unwrap_or("-"),
            config.poll_interval.as_millis()
        );
        return Ok(());
    }

    init_logging(parsed.log_file);
    let mut app = App::new();
    app.run(config).await
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
