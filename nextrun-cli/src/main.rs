use clap::Parser;
use jiff::Timestamp;
use nextrun::{ScheduleKind, ScheduleResolver, SyntaxValidator};
use std::process;
use tracing_subscriber::EnvFilter;

const MAX_COUNT: usize = 1000;

#[derive(Parser)]
#[command(
    name = "nextrun",
    about = "Print the run times of a `now`, `YYYY-MM-DD HH:MM:SS` or 5-field cron schedule",
    version
)]
struct Cli {
    /// Schedule (e.g., "*/15 9 * * 1" or "2026-12-25 09:00:00")
    schedule: Option<String>,

    /// Number of run times to show
    #[arg(short = 'n', long = "count", default_value = "1")]
    count: usize,

    /// Reference instant as an RFC 3339 timestamp (default: now)
    #[arg(long, value_name = "TIMESTAMP")]
    from: Option<String>,

    /// Walk backwards from the reference instant
    #[arg(long)]
    prev: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Validate the schedule and print its normalized form
    #[arg(long)]
    check: bool,

    /// Show the parsed cron fields as JSON
    #[arg(long)]
    parse: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let schedule = match cli.schedule {
        Some(ref schedule) => schedule.as_str(),
        None => {
            eprintln!("error: no schedule provided");
            process::exit(2);
        }
    };

    if cli.parse {
        print_parts(schedule);
    }

    let reference = match cli.from {
        Some(ref raw) => match raw.parse::<Timestamp>() {
            Ok(ts) => ts,
            Err(e) => {
                eprintln!("error: invalid --from timestamp '{raw}': {e}");
                process::exit(1);
            }
        },
        None => Timestamp::now(),
    };

    let mut resolver = ScheduleResolver::new(schedule, reference);
    if unresolvable(&resolver) {
        report_unresolvable(schedule, resolver.kind());
    }

    if cli.check {
        print_normalized(schedule, &mut resolver);
    }

    let mut count = cli.count;
    if count > MAX_COUNT {
        tracing::warn!(requested = count, "capped at {MAX_COUNT} occurrences");
        count = MAX_COUNT;
    }

    let results = if cli.prev {
        prev_n(&mut resolver, count)
    } else {
        resolver.next_n(count)
    };

    if cli.json {
        let iso_strings: Vec<String> = results.iter().map(ToString::to_string).collect();
        match serde_json::to_string(&iso_strings) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize: {e}");
                process::exit(1);
            }
        }
    } else {
        for ts in &results {
            println!("{ts}");
        }
    }
}

/// A cron schedule resolves only when it parsed and can fire; `now` and
/// exact timestamps resolve unless they fall outside the supported range.
fn unresolvable(resolver: &ScheduleResolver) -> bool {
    match resolver.kind() {
        ScheduleKind::Cron => !resolver.is_repeatable(),
        ScheduleKind::Now | ScheduleKind::Exact => resolver.clone().next().is_none(),
    }
}

fn report_unresolvable(schedule: &str, kind: ScheduleKind) -> ! {
    if kind != ScheduleKind::Cron {
        eprintln!("error: '{}' is outside the supported range", schedule.trim());
        process::exit(1);
    }
    let validator = SyntaxValidator::new(schedule);
    match validator.error() {
        Some(err) => eprintln!("{}", err.display_rich()),
        None => eprintln!(
            "error: '{}' never fires: no allowed month has a matching day",
            validator.input()
        ),
    }
    process::exit(1);
}

fn print_parts(schedule: &str) -> ! {
    let validator = SyntaxValidator::new(schedule);
    if let Some(err) = validator.error() {
        eprintln!("{}", err.display_rich());
        process::exit(1);
    }
    match serde_json::to_string_pretty(validator.parts()) {
        Ok(json) => {
            println!("{json}");
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: failed to serialize: {e}");
            process::exit(1);
        }
    }
}

fn print_normalized(schedule: &str, resolver: &mut ScheduleResolver) -> ! {
    match resolver.kind() {
        ScheduleKind::Now => println!("now"),
        ScheduleKind::Exact => match resolver.next() {
            Some(ts) => println!("{}", ts.strftime("%Y-%m-%d %H:%M:%S")),
            None => report_unresolvable(schedule, ScheduleKind::Exact),
        },
        ScheduleKind::Cron => println!("{}", SyntaxValidator::new(schedule)),
    }
    process::exit(0);
}

/// Up to `count` earlier run times, latest first.
fn prev_n(resolver: &mut ScheduleResolver, count: usize) -> Vec<Timestamp> {
    let limit = if resolver.is_repeatable() {
        count
    } else {
        count.min(1)
    };
    let mut out = Vec::with_capacity(limit);
    while out.len() < limit {
        match resolver.prev() {
            Some(ts) => out.push(ts),
            None => break,
        }
    }
    out
}
