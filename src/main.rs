use std::{
    env,
    fs::File,
    process,
};

use cairn::{
    cards,
    config::Config,
    scrape,
    store::{
        CardStore,
        RestStore,
    },
    CairnError,
    Card,
    CardDraft,
    Collection,
    Content,
    Correction,
    Status,
    Vocabulary,
};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), CairnError> {
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "list" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let filter = match args.get(2) {
                None => None,
                Some(s) => parse_filter(s)?,
            };
            let store = open_store()?;
            let cards = cards::list(&store, collection, filter)?;
            if cards.is_empty() {
                println!("no matching cards");
            }
            for card in &cards {
                print_card(card);
            }
        }
        "add" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let content = content_from_args(collection, &args[2..])?;
            let store = open_store()?;
            let card = store.insert(CardDraft::new(content, today()))?;
            println!("added card #{}", card.id);
        }
        "delete" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let id = parse_id(arg(args, 2)?)?;
            let store = open_store()?;
            store.delete(collection, id)?;
            println!("deleted card #{id}");
        }
        "set-status" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let id = parse_id(arg(args, 2)?)?;
            let status = Status::from_label(arg(args, 3)?).ok_or_else(|| {
                CairnError::Custom(format!("unknown status {:?}", arg(args, 3).unwrap_or("")))
            })?;
            if status == Status::Pushed {
                return Err(CairnError::Custom(
                    "a card only becomes pushed through a completed push".to_string(),
                ));
            }
            let store = open_store()?;
            let mut card = find_card(&store, collection, id)?;
            card.status = status;
            store.update(&card)?;
            println!("card #{id} is now {status}");
        }
        "dedup" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let store = open_store()?;
            let report = cards::dedup(&store, collection)?;
            println!("removed {} duplicate card(s)", report.removed);
            for id in &report.skipped {
                eprintln!("card #{id} has no identity content, skipped");
            }
            for (id, e) in &report.failed {
                eprintln!("failed to delete card #{id}: {e}");
            }
        }
        "import" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let path = arg(args, 2)?;
            let rows = cards::read_rows(File::open(path)?)?;
            let store = open_store()?;
            let report = cards::import(&store, collection, &rows, today())?;
            println!(
                "imported {} card(s), skipped {} (of {} rows)",
                report.imported,
                report.skipped,
                rows.len()
            );
            for (line, e) in &report.failed_rows {
                eprintln!("row {line} failed: {e}");
            }
        }
        "export" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let path = arg(args, 2)?;
            let store = open_store()?;
            let written = cards::export_csv(&store, collection, File::create(path)?)?;
            println!("exported {written} card(s) to {path}");
        }
        "push" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let config = Config::load_default()?;
            let recipients: Vec<String> = if args.len() > 2 {
                args[2..].to_vec()
            } else {
                config.recipients.emails.clone()
            };
            let store = RestStore::new(&config.store.url, &config.store.key)?;
            let account = config.account(collection);
            let mailer = cairn::mail::SmtpMailer::new(
                &config.smtp.host,
                config.smtp.port,
                &account.sender,
                &account.password,
            );
            let report = cards::push_pending(
                &store,
                &mailer,
                collection,
                &account.sender,
                &recipients,
                today(),
            )?;
            println!("pushed {} of {} card(s)", report.committed, report.attempted);
            for (id, e) in &report.failed {
                eprintln!("failed to mark card #{id} pushed: {e}");
            }
        }
        "repair" => {
            let collection = parse_collection(arg(args, 1)?)?;
            let store = open_store()?;
            let report = cards::repair_statuses(&store, collection)?;
            println!(
                "repaired {} of {} record(s)",
                report.repaired, report.examined
            );
            for (id, e) in &report.failed {
                eprintln!("failed to repair card #{id}: {e}");
            }
        }
        "scrape" => {
            let vocab = scrape::word_of_the_day()?;
            let store = open_store()?;
            let card = store.insert(CardDraft::new(Content::Vocabulary(vocab), today()))?;
            println!("added card #{} from the word of the day", card.id);
            print_card(&card);
        }
        _ => {
            print_usage();
            return Err(CairnError::Custom(format!("unknown command {command:?}")));
        }
    }
    Ok(())
}

fn print_usage() {
    println!("usage: cairn <command> [args]");
    println!();
    println!("  list <collection> [status|all]");
    println!("  add vocabulary <headword> [phonetic] [definition] [example] [note] [source]");
    println!("  add correction <source-text> <target-text> [meaning] [recommended] [issue-type]");
    println!("  delete <collection> <id>");
    println!("  set-status <collection> <id> <status>");
    println!("  dedup <collection>");
    println!("  import <collection> <file.csv>");
    println!("  export <collection> <file.csv>");
    println!("  push <collection> [recipient...]");
    println!("  repair <collection>");
    println!("  scrape");
    println!();
    println!("collections: vocabulary, correction");
    println!("statuses: unreviewed, reviewed, pending_push, pushed");
}

fn arg(args: &[String], index: usize) -> Result<&str, CairnError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| CairnError::Custom("missing argument, see usage".to_string()))
}

fn parse_collection(arg: &str) -> Result<Collection, CairnError> {
    match arg {
        "vocabulary" | "vocab" => Ok(Collection::Vocabulary),
        "correction" | "corrections" => Ok(Collection::Correction),
        other => Err(CairnError::Custom(format!("unknown collection {other:?}"))),
    }
}

fn parse_filter(arg: &str) -> Result<Option<Status>, CairnError> {
    if arg == "all" {
        return Ok(None);
    }
    Status::from_label(arg)
        .map(Some)
        .ok_or_else(|| CairnError::Custom(format!("unknown status {arg:?}")))
}

fn parse_id(arg: &str) -> Result<i64, CairnError> {
    arg.parse().map_err(|_| CairnError::Custom(format!("invalid card id {arg:?}")))
}

fn content_from_args(collection: Collection, rest: &[String]) -> Result<Content, CairnError> {
    let field = |index: usize| rest.get(index).cloned().unwrap_or_default();
    match collection {
        Collection::Vocabulary => {
            if rest.is_empty() {
                return Err(CairnError::Custom("a vocabulary card needs a headword".to_string()));
            }
            Ok(Content::Vocabulary(Vocabulary {
                headword: field(0),
                phonetic: field(1),
                definition: field(2),
                example: field(3),
                note: field(4),
                source: field(5),
            }))
        }
        Collection::Correction => {
            if rest.len() < 2 {
                return Err(CairnError::Custom(
                    "a correction card needs source and target text".to_string(),
                ));
            }
            Ok(Content::Correction(Correction {
                source_text: field(0),
                target_text: field(1),
                meaning: field(2),
                recommended: field(3),
                issue_type: field(4),
            }))
        }
    }
}

fn open_store() -> Result<RestStore, CairnError> {
    let config = Config::load_default()?;
    Ok(RestStore::new(&config.store.url, &config.store.key)?)
}

fn find_card(
    store: &impl CardStore,
    collection: Collection,
    id: i64,
) -> Result<Card, CairnError> {
    store
        .list(collection)?
        .into_iter()
        .find(|card| card.id == id)
        .ok_or_else(|| CairnError::Custom(format!("no card #{id} in {}", collection.label())))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_card(card: &Card) {
    println!("#{} [{}]", card.id, card.status);
    print!("{}", card.digest_block());
    println!();
}
