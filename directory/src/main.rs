//! Directory - sample topology runner
//!
//! Builds an in-memory directory from environment configuration, seeds a
//! sample organisation, resolves a few memberships and prints a summary.

use directory::{Directory, DirectoryConfig, DirectoryStats};
use tracing_subscriber::EnvFilter;

/// Sample organisation: (group, parent) nesting and (user, group) membership.
const SAMPLE_NESTING: &[(&str, &str)] = &[
    ("backend", "eng"),
    ("frontend", "eng"),
    ("db", "backend"),
    ("eng", "staff"),
    ("ops", "staff"),
];

const SAMPLE_MEMBERS: &[(&str, &str)] = &[
    ("alice", "backend"),
    ("bob", "frontend"),
    ("carol", "db"),
    ("dave", "ops"),
];

fn seed(directory: &Directory) -> anyhow::Result<()> {
    for (child, parent) in SAMPLE_NESTING {
        for name in [child, parent] {
            if directory.find_group(name).is_none() {
                directory.create_group(name)?;
            }
        }
        directory.add_group_to_group(child, parent)?;
    }

    for (user, group) in SAMPLE_MEMBERS {
        if directory.find_user(user).is_none() {
            directory.create_user(user)?;
        }
        directory.add_user_to_group(user, group)?;
    }

    Ok(())
}

fn summary(stats: &DirectoryStats) {
    println!();
    println!("┌──────────────────────────────────────────┐");
    println!("│ Summary                                  │");
    println!("├──────────────────────────────────────────┤");
    println!("│ Users:               {:>4}                │", stats.users);
    println!("│ Groups:              {:>4}                │", stats.groups);
    println!("│ Direct memberships:  {:>4}                │", stats.memberships);
    println!("│ Nested groups:       {:>4}                │", stats.nestings);
    println!("└──────────────────────────────────────────┘");
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = DirectoryConfig::from_env();
    tracing::info!(cycle_policy = ?config.cycle_policy, "Starting directory");

    let directory = Directory::new(&config);
    if !config.seed_sample {
        tracing::info!("Sample seeding disabled, nothing to do");
        summary(&directory.stats());
        return Ok(());
    }

    seed(&directory)?;

    for (user, group) in [("carol", "staff"), ("dave", "eng"), ("alice", "frontend")] {
        let member = directory.is_user_in_group(user, group)?;
        println!("{user:>6} in {group:<9} {member}");
    }

    let effective: Vec<String> = directory
        .effective_users_in_group("eng")?
        .iter()
        .map(|u| u.to_string())
        .collect();
    println!("effective members of eng: {}", effective.join(", "));

    if let Err(err) = directory.add_group_to_group("staff", "db") {
        tracing::warn!(error = %err, "Nesting refused");
    }

    directory.delete_group("backend")?;
    println!(
        "after deleting backend, carol in eng: {}",
        directory.is_user_in_group("carol", "eng")?
    );

    summary(&directory.stats());
    Ok(())
}
