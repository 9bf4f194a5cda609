pub mod classifier;
pub mod config;
pub mod css;
pub mod generator;
pub mod log_init;
pub mod policy;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod source;
pub mod tokens;
pub mod variants;
pub mod vocabulary;

use globset::{Glob, GlobSet, GlobSetBuilder};
use scanner::ScanGlobOptions;
use session::Session;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckOptions {
    pub inputs: Vec<String>,
    pub ignore: Vec<String>,
    pub config: Option<String>,
    pub css: Option<String>,
    pub root: Option<String>,
    pub no_arbitrary: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check(CheckOptions),
    Classes(CheckOptions),
    Watch {
        check: CheckOptions,
        poll: bool,
        poll_interval_ms: u64,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    pub message: String,
}

pub fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Check(options) => {
            let problems = run_check(&options)?;
            if problems > 0 {
                return Err(CliError {
                    message: format!("{} undefined class(es) found", problems),
                });
            }
            Ok(())
        }
        Command::Classes(options) => run_classes(&options),
        Command::Watch {
            check,
            poll,
            poll_interval_ms,
        } => run_watch(&check, poll, poll_interval_ms),
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

pub fn run_from_env() -> Result<(), CliError> {
    let command = parse_args(env::args().skip(1))?;
    run(command)
}

pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let Some(cmd) = iter.next() else {
        return Ok(Command::Help);
    };

    match cmd.as_str() {
        "check" => {
            let (options, _) = parse_check_args("check", iter.collect(), false)?;
            require_inputs("check", &options)?;
            Ok(Command::Check(options))
        }
        "classes" => {
            let (options, _) = parse_check_args("classes", iter.collect(), false)?;
            if !options.inputs.is_empty() || !options.ignore.is_empty() {
                return Err(CliError {
                    message: "classes does not take file patterns".to_string(),
                });
            }
            Ok(Command::Classes(options))
        }
        "watch" => {
            let (check, poll) = parse_check_args("watch", iter.collect(), true)?;
            require_inputs("watch", &check)?;
            let (poll, poll_interval_ms) = poll.unwrap_or((false, 500));
            Ok(Command::Watch {
                check,
                poll,
                poll_interval_ms,
            })
        }
        "-h" | "--help" | "help" => Ok(Command::Help),
        _ => Err(CliError {
            message: format!("unknown command: {}", cmd),
        }),
    }
}

type PollSettings = Option<(bool, u64)>;

fn parse_check_args(
    command: &str,
    args: Vec<String>,
    allow_poll: bool,
) -> Result<(CheckOptions, PollSettings), CliError> {
    let mut options = CheckOptions::default();
    let mut poll = None;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--config" | "-c" => {
                idx += 1;
                options.config = Some(flag_value(command, &args, idx, "--config")?);
            }
            "--css" | "-s" => {
                idx += 1;
                options.css = Some(flag_value(command, &args, idx, "--css")?);
            }
            "--root" | "-r" => {
                idx += 1;
                options.root = Some(flag_value(command, &args, idx, "--root")?);
            }
            "--ignore" | "-I" => {
                idx += 1;
                options.ignore.push(flag_value(command, &args, idx, "--ignore")?);
            }
            "--no-arbitrary" => options.no_arbitrary = true,
            "--debug" => options.debug = true,
            "--poll" | "--poll-interval" if !allow_poll => {
                return Err(CliError {
                    message: format!("{} is only supported with watch", args[idx]),
                });
            }
            "--poll" => {
                let interval = poll.map(|(_, ms)| ms).unwrap_or(500);
                poll = Some((true, interval));
            }
            "--poll-interval" => {
                idx += 1;
                let value = flag_value(command, &args, idx, "--poll-interval")?;
                poll = Some((true, parse_u64_arg(&value, "--poll-interval")?));
            }
            value => options.inputs.push(value.to_string()),
        }
        idx += 1;
    }

    Ok((options, poll))
}

fn flag_value(command: &str, args: &[String], idx: usize, flag: &str) -> Result<String, CliError> {
    args.get(idx).cloned().ok_or_else(|| CliError {
        message: format!("{} requires a value for {}", command, flag),
    })
}

fn require_inputs(command: &str, options: &CheckOptions) -> Result<(), CliError> {
    if options.inputs.is_empty() {
        return Err(CliError {
            message: format!("{} requires at least one path or glob pattern", command),
        });
    }
    Ok(())
}

fn parse_u64_arg(value: &str, flag: &str) -> Result<u64, CliError> {
    value.parse::<u64>().map_err(|_| CliError {
        message: format!("{} requires a positive integer, got '{}'", flag, value),
    })
}

fn project_root(options: &CheckOptions) -> PathBuf {
    options
        .root
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Loads configuration, applies command-line overrides and starts a session.
fn open_session(options: &CheckOptions) -> Result<Session, CliError> {
    let root = project_root(options);
    let mut config = config::load_or_default(options.config.as_deref().map(Path::new), &root)
        .map_err(|err| CliError {
            message: err.message,
        })?;
    if let Some(css) = &options.css {
        config.css_file = css.clone();
    }
    if options.no_arbitrary {
        config.allow_arbitrary_values = false;
    }
    if options.debug {
        config.debug = true;
    }
    log_init::init_logger(config.debug);
    Ok(Session::new(config, root))
}

/// Lints every matching file and prints one line per finding. Returns the
/// number of findings.
pub fn run_check(options: &CheckOptions) -> Result<usize, CliError> {
    let session = open_session(options)?;
    let scan_options = ScanGlobOptions {
        base_path: session.root().to_path_buf(),
        ..ScanGlobOptions::default()
    };
    let files = scanner::find_files(&options.inputs, &options.ignore, &scan_options).map_err(
        |err| CliError {
            message: err.message,
        },
    )?;

    let mut problems = 0;
    for path in &files {
        let sites = match scanner::scan_file(path) {
            Ok(sites) => sites,
            Err(err) => {
                log::warn!("{}", err.message);
                continue;
            }
        };
        for located in &sites {
            for finding in session.check_site_at(&located.site, located.position) {
                println!(
                    "{}:{}:{}: {}",
                    path.display(),
                    finding.line,
                    finding.column,
                    finding
                );
                problems += 1;
            }
        }
    }

    eprintln!("checked {} files, {} problem(s)", files.len(), problems);
    Ok(problems)
}

fn run_classes(options: &CheckOptions) -> Result<(), CliError> {
    let session = open_session(options)?;
    let vocabulary = session.vocabulary();
    for (class, origin) in vocabulary.classes() {
        println!("{}\t{}", class, origin);
    }
    for variant in vocabulary.custom_variants() {
        println!("{}:\tcustom variant", variant);
    }
    eprintln!(
        "{} classes from {}, framework import: {}",
        vocabulary.len(),
        session.css_path().display(),
        if vocabulary.has_base_framework_import() {
            "yes"
        } else {
            "no"
        }
    );
    Ok(())
}

fn run_watch(options: &CheckOptions, poll: bool, poll_interval_ms: u64) -> Result<(), CliError> {
    if let Err(err) = run_check(options) {
        eprintln!("check failed: {}", err.message);
    }

    let (tx, rx) = channel();
    let ignore_set = build_globset(&options.ignore).ok();
    let mut watcher: Box<dyn notify::Watcher> = if poll {
        Box::new(
            notify::PollWatcher::new(
                tx,
                notify::Config::default()
                    .with_poll_interval(Duration::from_millis(poll_interval_ms)),
            )
            .map_err(|err| CliError {
                message: format!("failed to start poll watcher: {}", err),
            })?,
        )
    } else {
        Box::new(notify::recommended_watcher(tx).map_err(|err| CliError {
            message: format!("failed to start watcher: {}", err),
        })?)
    };

    for root in watch_roots_for_check(options) {
        watcher
            .watch(&root, notify::RecursiveMode::Recursive)
            .map_err(|err| CliError {
                message: format!("failed to watch {}: {}", root.display(), err),
            })?;
    }

    if poll {
        eprintln!("watching for changes (polling, press Ctrl+C to stop)...");
    } else {
        eprintln!("watching for changes (press Ctrl+C to stop)...");
    }

    let mut last_event = Instant::now();
    loop {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(event_result) => {
                let event = match event_result {
                    Ok(event) => event,
                    Err(err) => {
                        eprintln!("watch error: {}", err);
                        continue;
                    }
                };
                if should_ignore_event(&event, ignore_set.as_ref()) {
                    continue;
                }
                if last_event.elapsed() < Duration::from_millis(200) {
                    continue;
                }
                last_event = Instant::now();
                eprintln!("change detected, checking again...");
                if let Err(err) = run_check(options) {
                    eprintln!("check failed: {}", err.message);
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(_) => break,
        }
    }

    Ok(())
}

/// Directories to watch: the static prefix of every input pattern, the
/// stylesheet's directory and the config file's directory, all under the
/// project root.
fn watch_roots_for_check(options: &CheckOptions) -> Vec<PathBuf> {
    let root = project_root(options);
    let css = options.css.as_deref();
    let config = options.config.as_deref();

    let mut roots = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for pattern in options.inputs.iter().map(String::as_str).chain(css) {
        let dir = root.join(glob_root(pattern));
        if seen.insert(dir.clone()) {
            roots.push(dir);
        }
    }
    if let Some(config) = config {
        let dir = glob_root(config);
        if seen.insert(dir.clone()) {
            roots.push(dir);
        }
    }
    roots
}

fn glob_root(pattern: &str) -> PathBuf {
    let Some(first_meta) = pattern.find(['*', '?', '[', '{']) else {
        if pattern.ends_with('/') || pattern.ends_with('\\') {
            return PathBuf::from(pattern);
        }
        let path = Path::new(pattern);
        if path.extension().is_some() {
            return path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf();
        }
        return path.to_path_buf();
    };

    let prefix = &pattern[..first_meta];
    if prefix.ends_with(['/', '\\']) {
        let trimmed = prefix.trim_end_matches(['/', '\\']);
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    match prefix.rfind(['/', '\\']) {
        Some(idx) if idx > 0 => PathBuf::from(&prefix[..idx]),
        _ => PathBuf::from("."),
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, CliError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| CliError {
            message: format!("invalid glob pattern '{}': {}", pattern, err),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|err| CliError {
        message: format!("failed to build ignore glob set: {}", err),
    })
}

fn should_ignore_event(event: &notify::Event, ignore_set: Option<&GlobSet>) -> bool {
    let Some(ignore_set) = ignore_set else {
        return false;
    };
    if event.paths.is_empty() {
        return false;
    }
    event.paths.iter().all(|path| ignore_set.is_match(path))
}

fn print_help() {
    println!("ironframe-lint");
    println!();
    println!("USAGE:");
    println!(
        "  ironframe-lint check [--config <path>] [--css <path>] [--root <dir>] [--ignore <glob>] [--no-arbitrary] [--debug] <glob...>"
    );
    println!("  ironframe-lint classes [--config <path>] [--css <path>] [--root <dir>] [--debug]");
    println!(
        "  ironframe-lint watch [check options] [--poll] [--poll-interval <ms>] <glob...>"
    );
    println!();
    println!("The stylesheet path and file patterns are relative to --root (default \".\").");
    println!(
        "Without --config, {} in the root is used when present.",
        config::DEFAULT_CONFIG_FILE
    );
    println!();
    println!("EXAMPLES:");
    println!("  ironframe-lint check \"src/**/*.{{tsx,jsx}}\"");
    println!("  ironframe-lint check --css app/globals.css -I \"**/*.test.tsx\" \"app/**/*.tsx\"");
    println!("  ironframe-lint classes --debug");
    println!("  ironframe-lint watch --poll --poll-interval 250 \"src/**/*.tsx\"");
}

#[cfg(test)]
mod tests {
    use super::{CheckOptions, Command, glob_root, parse_args, run_check, watch_roots_for_check};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(parse_args(Vec::new()).expect("help"), Command::Help);
        assert_eq!(parse_args(args(&["--help"])).expect("help"), Command::Help);
    }

    #[test]
    fn parse_check_supports_all_flags() {
        let command = parse_args(args(&[
            "check",
            "--config",
            "lint.toml",
            "--css",
            "app/app.css",
            "--root",
            "web",
            "-I",
            "**/gen/**",
            "--no-arbitrary",
            "--debug",
            "src/**/*.tsx",
        ]))
        .expect("check args should parse");

        assert_eq!(
            command,
            Command::Check(CheckOptions {
                inputs: vec!["src/**/*.tsx".to_string()],
                ignore: vec!["**/gen/**".to_string()],
                config: Some("lint.toml".to_string()),
                css: Some("app/app.css".to_string()),
                root: Some("web".to_string()),
                no_arbitrary: true,
                debug: true,
            })
        );
    }

    #[test]
    fn parse_watch_supports_polling() {
        let command = parse_args(args(&["watch", "--poll-interval", "250", "src/**/*.tsx"]))
            .expect("watch args should parse");
        assert_eq!(
            command,
            Command::Watch {
                check: CheckOptions {
                    inputs: vec!["src/**/*.tsx".to_string()],
                    ..CheckOptions::default()
                },
                poll: true,
                poll_interval_ms: 250,
            }
        );

        let command = parse_args(args(&["watch", "src"])).expect("watch args should parse");
        assert!(matches!(
            command,
            Command::Watch {
                poll: false,
                poll_interval_ms: 500,
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(args(&["lint"])).is_err());
        assert!(parse_args(args(&["check"])).is_err());
        assert!(parse_args(args(&["check", "--css"])).is_err());
        assert!(parse_args(args(&["check", "--poll", "src"])).is_err());
        assert!(parse_args(args(&["classes", "src/**/*.tsx"])).is_err());
        assert!(parse_args(args(&["watch", "--poll-interval", "soon", "src"])).is_err());
    }

    #[test]
    fn glob_roots() {
        assert_eq!(glob_root("src/**/*.tsx"), PathBuf::from("src"));
        assert_eq!(glob_root("src/comp*/index.tsx"), PathBuf::from("src"));
        assert_eq!(glob_root("**/*.tsx"), PathBuf::from("."));
        assert_eq!(glob_root("app/globals.css"), PathBuf::from("app"));
        assert_eq!(glob_root("page.tsx"), PathBuf::from("."));
        assert_eq!(glob_root("components"), PathBuf::from("components"));
    }

    #[test]
    fn watch_roots_cover_sources_stylesheet_and_config() {
        let roots = watch_roots_for_check(&CheckOptions {
            inputs: vec!["packages/app/src/**/*.tsx".to_string()],
            css: Some("styles/app.css".to_string()),
            config: Some("config/lint.toml".to_string()),
            ..CheckOptions::default()
        });
        assert!(roots.contains(&PathBuf::from("./packages/app/src")));
        assert!(roots.contains(&PathBuf::from("./styles")));
        assert!(roots.contains(&PathBuf::from("config")));
    }

    #[test]
    fn check_counts_findings_across_files() {
        let root = temp_dir("lint_check");
        let _ = fs::create_dir_all(root.join("src/styles"));
        let _ = fs::write(
            root.join("src/styles/globals.css"),
            "@import \"tailwindcss\";\n@theme { --color-brand: #f00; }\n.custom-badge { }",
        );
        let _ = fs::write(
            root.join("src/Badge.tsx"),
            "export const Badge = () => <span className=\"flex custom-badge unknown-xyz\" />;",
        );
        let _ = fs::write(
            root.join("src/Card.tsx"),
            "const c = cn(\"bg-brand\", `p-4 ${x} nope`, \"w-[13px]\");",
        );

        let options = CheckOptions {
            inputs: vec!["src/**/*.tsx".to_string()],
            root: Some(root.to_string_lossy().to_string()),
            ..CheckOptions::default()
        };
        assert_eq!(run_check(&options).expect("check should run"), 2);

        let strict = CheckOptions {
            no_arbitrary: true,
            ..options
        };
        assert_eq!(run_check(&strict).expect("check should run"), 3);

        let _ = fs::remove_dir_all(&root);
    }

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}", prefix, nanos))
    }
}
