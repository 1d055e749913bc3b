use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use storage::repository::GroupRecord;
use storage::sqlite::SqliteRepository;
use vocab_core::model::{DirectionStats, GroupId, OwnerId, WordStats};
use vocab_core::time::Clock;

/// Seeds a demo vocabulary into a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "seed", about, long_about = None)]
struct Args {
    /// SQLite URL
    #[arg(
        long = "db",
        env = "VOCAB_DB_URL",
        default_value = "sqlite:vocab.sqlite3?mode=rwc",
        value_parser = non_empty
    )]
    db_url: String,

    /// Owner id to seed
    #[arg(long, env = "VOCAB_OWNER", default_value_t = OwnerId::new(1))]
    owner: OwnerId,

    /// Language the words belong to
    #[arg(long, env = "VOCAB_LANGUAGE", default_value = "es", value_parser = non_empty)]
    language: String,

    /// Name of the sample group
    #[arg(long, default_value = "animals")]
    group: String,

    /// Skip creating the sample group
    #[arg(long, conflicts_with = "group")]
    no_group: bool,

    /// Give sample words some training history
    #[arg(long)]
    trained: bool,

    /// Fixed current time (RFC 3339) for deterministic seeding
    #[arg(long, value_parser = parse_rfc3339)]
    now: Option<DateTime<Utc>>,
}

impl Args {
    fn group(&self) -> Option<&str> {
        (!self.no_group).then_some(self.group.as_str())
    }
}

fn non_empty(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        Err("value cannot be empty".into())
    } else {
        Ok(raw.to_owned())
    }
}

fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC3339: {e}"))
}

const SAMPLES: [(&str, &[&str]); 10] = [
    ("cat", &["gato", "minino"]),
    ("dog", &["perro"]),
    ("horse", &["caballo"]),
    ("bird", &["pájaro", "ave"]),
    ("house", &["casa", "hogar"]),
    ("bread", &["pan"]),
    ("water", &["agua"]),
    ("elephant", &["elefante"]),
    ("window", &["ventana"]),
    ("book", &["libro"]),
];

const ANIMALS: [&str; 5] = ["cat", "dog", "horse", "bird", "elephant"];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let now = args.now.unwrap_or_else(Utc::now);
    let repo = SqliteRepository::connect(&args.db_url)
        .await?
        .with_clock(Clock::fixed(now));
    repo.migrate().await?;

    for (i, (text, translations)) in SAMPLES.iter().enumerate() {
        let offset = i64::try_from(i)?;
        let mut word = WordStats::new(
            *text,
            translations.iter().map(|t| (*t).to_owned()).collect(),
            now - Duration::days(offset),
        )?;
        if args.trained && i % 2 == 0 {
            let count = u32::try_from(i)? + 2;
            let last = Some(now - Duration::hours(offset));
            word.from = DirectionStats::new(count / 2, count, last)?;
            word.to = DirectionStats::new(count - 1, count, last)?;
        }
        repo.upsert_word(args.owner, &args.language, &word).await?;
    }

    if let Some(name) = args.group() {
        let group = GroupRecord {
            id: GroupId::new(format!("{}-{}-{name}", args.owner, args.language)),
            name: name.to_owned(),
        };
        let members: Vec<String> = ANIMALS.iter().map(|w| (*w).to_owned()).collect();
        repo.insert_group(args.owner, &args.language, &group, &members)
            .await?;
    }

    println!(
        "Seeded {} words{} for owner {} ({}) into {}",
        SAMPLES.len(),
        args.group()
            .map(|g| format!(" and group '{g}'"))
            .unwrap_or_default(),
        args.owner,
        args.language,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
