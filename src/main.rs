use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use num_format::{Locale, ToFormattedString};
use offer_scout::config::{Cli, ClientConfig, Command, FilterField, SetArgs};
use offer_scout::filters::FileStorage;
use offer_scout::{FilterState, FilterStore, OfferClient, QueryOrchestrator, QuerySnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(&cli.endpoint, Duration::from_secs(cli.timeout_secs))?;
    let storage = FileStorage::new(&cli.state_dir)?;
    let store = FilterStore::open(Arc::new(storage));

    match cli.command {
        Command::Filters => print_filters(&store.snapshot()),
        Command::Set(args) => {
            apply_set(&store, args);
            print_filters(&store.snapshot());
        }
        Command::Unset { fields } => {
            for field in fields {
                unset(&store, field);
            }
            print_filters(&store.snapshot());
        }
        Command::Reset => {
            store.reset();
            print_filters(&store.snapshot());
        }
        Command::Offers { all } => {
            let orchestrator = QueryOrchestrator::new(Arc::new(OfferClient::new(config)?));
            let params = (!all).then(|| store.snapshot());

            info!("🏠 Fetching offers from {}", cli.endpoint);
            let snapshot = orchestrator.fetch(params.as_ref()).await;
            print_offers(&snapshot);
        }
        Command::Browse => {
            let orchestrator = QueryOrchestrator::new(Arc::new(OfferClient::new(config)?));
            info!("🏠 Browsing offers from {}", cli.endpoint);
            print_help();

            // Input ends the session; the follower only reacts to filter edits
            tokio::select! {
                _ = orchestrator.follow(store.subscribe(), |snapshot| print_offers(&snapshot)) => {}
                result = browse(&store, &orchestrator) => result?,
            }
        }
    }

    Ok(())
}

fn apply_set(store: &FilterStore, args: SetArgs) {
    if let Some(location) = args.location {
        store.set_location(Some(location));
    }
    if let Some(price) = args.price {
        store.set_price(Some(price));
    }
    if let Some(rooms) = args.rooms {
        store.set_rooms(Some(rooms));
    }
    if let Some(exclude) = args.exclude {
        store.set_exclude(Some(exclude));
    }
}

fn unset(store: &FilterStore, field: FilterField) {
    match field {
        FilterField::Location => store.set_location(None),
        FilterField::Price => store.set_price(None),
        FilterField::Rooms => store.set_rooms(None),
        FilterField::Exclude => store.set_exclude(None),
    }
}

/// One line typed during `browse`
#[derive(Debug, PartialEq)]
enum BrowseInput {
    Location(String),
    Price(f64),
    Rooms(u32),
    Exclude(bool),
    Unset(FilterField),
    Reset,
    Show,
    Refresh,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<BrowseInput> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let input = match word {
        "location" => BrowseInput::Location(rest.to_string()),
        "price" => BrowseInput::Price(rest.parse().context("price must be a number")?),
        "rooms" => BrowseInput::Rooms(rest.parse().context("rooms must be a whole number")?),
        "exclude" => BrowseInput::Exclude(rest.parse().context("exclude must be true or false")?),
        "unset" => BrowseInput::Unset(
            FilterField::from_str(rest, true)
                .map_err(|e| anyhow::anyhow!("unknown filter {:?}: {}", rest, e))?,
        ),
        "reset" => BrowseInput::Reset,
        "show" | "" => BrowseInput::Show,
        "refresh" => BrowseInput::Refresh,
        "help" => BrowseInput::Help,
        "quit" | "exit" => BrowseInput::Quit,
        other => anyhow::bail!("unknown command {:?}, try help", other),
    };
    Ok(input)
}

async fn browse(store: &FilterStore, orchestrator: &QueryOrchestrator) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("{:#}", e);
                continue;
            }
        };

        match input {
            BrowseInput::Location(location) => store.set_location(Some(location)),
            BrowseInput::Price(price) => store.set_price(Some(price)),
            BrowseInput::Rooms(rooms) => store.set_rooms(Some(rooms)),
            BrowseInput::Exclude(exclude) => store.set_exclude(Some(exclude)),
            BrowseInput::Unset(field) => unset(store, field),
            BrowseInput::Reset => store.reset(),
            BrowseInput::Show => print_filters(&store.snapshot()),
            BrowseInput::Refresh => {
                let snapshot = orchestrator.refresh(Some(&store.snapshot())).await;
                print_offers(&snapshot);
            }
            BrowseInput::Help => print_help(),
            BrowseInput::Quit => break,
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands: location <text> | price <n> | rooms <n> | exclude <true|false>");
    println!("          unset <field> | reset | show | refresh | help | quit");
}

fn print_filters(state: &FilterState) {
    fn show<T: ToString>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string())
    }

    println!("Location: {}", show(&state.location));
    println!("Price:    {}", show(&state.price));
    println!("Rooms:    {}", show(&state.rooms));
    println!("Exclude:  {}", show(&state.exclude));
}

fn print_offers(snapshot: &QuerySnapshot) {
    if snapshot.data.is_empty() {
        println!("No offers");
        return;
    }

    println!();
    for (i, offer) in snapshot.data.iter().enumerate() {
        println!("{}. {} ({} zł)", i + 1, offer.location, pretty_price(offer.price));
        println!(
            "   {} zł/m², {} m², {} rooms",
            pretty_price(offer.price_per_m2),
            offer.area,
            offer.rooms
        );
        println!("   URL: {}", offer.detail_url);
    }
    if let Some(fetched_at) = snapshot.fetched_at {
        println!(
            "\n{} offers, fetched {}",
            snapshot.data.len(),
            fetched_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

/// Polish number formatting with up to three decimals: `10883.1168` -> `10 883,117`
///
/// Four-digit integer parts stay ungrouped, as in the `pl` locale.
fn pretty_price(price: f64) -> String {
    if !price.is_finite() {
        return price.to_string();
    }

    let scaled = (price.abs() * 1000.0).round() as u64;
    let (whole, fraction) = (scaled / 1000, scaled % 1000);

    let mut formatted = if whole < 10_000 {
        whole.to_string()
    } else {
        whole.to_formatted_string(&Locale::pl)
    };
    if fraction > 0 {
        let digits = format!("{:03}", fraction);
        formatted.push_str(Locale::pl.decimal());
        formatted.push_str(digits.trim_end_matches('0'));
    }

    if price < 0.0 && scaled > 0 {
        format!("{}{}", Locale::pl.minus_sign(), formatted)
    } else {
        formatted
    }
}
