//! Basic nextrun walkthrough: classify, step, match, display.

use jiff::Timestamp;
use nextrun::{CronScheduler, Direction, ScheduleResolver, SyntaxValidator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let reference: Timestamp = "2026-02-06T12:00:00Z".parse()?;

    // Resolve each kind of schedule string
    for schedule in ["now", "2022-01-01 00:00:00", "0 9 * * 1", "not a schedule"] {
        let mut resolver = ScheduleResolver::new(schedule, reference);
        match resolver.next() {
            Some(next) => println!(
                "{schedule:>20} -> {next} ({:?}, repeatable: {})",
                resolver.kind(),
                resolver.is_repeatable()
            ),
            None => println!("{schedule:>20} -> cannot resolve"),
        }
    }

    // Walk a cron schedule both ways
    let mut cron = CronScheduler::new("0 0 13 * 5", reference);
    println!("\n'0 0 13 * 5' fires on the 13th or on Fridays:");
    for next in cron.occurrences(Direction::Forward).take(4) {
        println!("  {}", next?);
    }
    println!("stepping back:");
    for prev in cron.occurrences(Direction::Backward).take(2) {
        println!("  {}", prev?);
    }

    // Check an instant
    let friday: Timestamp = "2026-03-20T00:00:00Z".parse()?;
    println!("\n{friday} matches: {}", cron.matches(friday));

    // Glued expressions display in canonical form
    let validator: SyntaxValidator = "0 0 1*/2*".parse()?;
    println!("\n'0 0 1*/2*' is {validator}");

    // Errors point at the offending field
    if let Err(err) = "0 0 1 */13 *".parse::<SyntaxValidator>() {
        println!("\n{}", err.display_rich());
    }

    Ok(())
}
