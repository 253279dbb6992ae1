mod display;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use display::output::{
    display_cache_stats, display_champions, display_error, display_games, display_info,
    display_keywords, display_refresh_report, display_search_results, display_seasons,
    display_success, display_summoner, display_versions,
};
use indicatif::{ProgressBar, ProgressStyle};
use opgg_client::{Config, EntityType, GameType, Language, Opgg, Region, RefreshRequest};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "opgg")]
#[command(about = "Query op.gg with a local metadata cache", long_about = None)]
struct Args {
    /// Language code for metadata (e.g. en_US, ko_KR)
    #[arg(short, long, global = true)]
    lang: Option<Language>,

    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List champions, or look one up
    Champions {
        /// Case-insensitive name filter
        #[arg(short, long)]
        name: Option<String>,

        /// Champion ID
        #[arg(long, conflicts_with = "name")]
        id: Option<u32>,

        /// Ignore the cache
        #[arg(long)]
        refresh: bool,
    },
    /// List ranked seasons
    Seasons {
        #[arg(long)]
        refresh: bool,
    },
    /// List game versions
    Versions {
        #[arg(long)]
        refresh: bool,
    },
    /// List champion keywords
    Keywords {
        #[arg(long)]
        refresh: bool,
    },
    /// Refetch cached metadata
    Refresh {
        /// Entity types to refresh (default: all)
        #[arg(short, long = "entity")]
        entities: Vec<EntityType>,

        /// Refresh every cached language
        #[arg(long)]
        all_languages: bool,
    },
    /// Delete cached metadata
    Clear {
        /// Only this entity type
        #[arg(short, long)]
        entity: Option<EntityType>,
    },
    /// Show what is cached and how fresh it is
    Stats,
    /// Find summoners by Riot ID (Name#TAG), comma separated for several
    Search {
        riot_ids: String,

        #[arg(short, long)]
        region: Option<Region>,
    },
    /// Ranked profile for a summoner ID
    Summoner {
        summoner_id: String,

        #[arg(short, long)]
        region: Option<Region>,
    },
    /// Recent games for a summoner ID
    Games {
        summoner_id: String,

        #[arg(short, long)]
        region: Option<Region>,

        /// Number of games (max 20)
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// total, ranked or normal
        #[arg(short = 't', long = "type", default_value = "total")]
        game_type: GameType,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "opgg_client=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_env();
    let language = args.lang.unwrap_or(config.language);
    let opgg = Opgg::new(config);

    match args.command {
        Command::Champions { name, id, refresh } => {
            let champions = match (id, name) {
                (Some(id), _) => opgg
                    .get_champion_by_id(id, Some(language))?
                    .into_iter()
                    .collect(),
                (None, Some(name)) => opgg.find_champions(&name, Some(language))?,
                (None, None) => opgg.get_all_champions(Some(language), refresh)?,
            };
            display_champions(&champions, language);
        }
        Command::Seasons { refresh } => {
            display_seasons(&opgg.get_all_seasons(refresh)?);
        }
        Command::Versions { refresh } => {
            display_versions(&opgg.get_versions(refresh)?);
        }
        Command::Keywords { refresh } => {
            display_keywords(&opgg.get_keywords(Some(language), refresh)?, language);
        }
        Command::Refresh {
            entities,
            all_languages,
        } => {
            let request = RefreshRequest {
                entity_types: entities,
                language: Some(language),
                all_languages,
            };

            let pb = ProgressBar::new(opgg.refresh_size(&request) as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
                pb.set_style(style);
            }
            pb.set_message("Refreshing cache");
            let report = opgg.force_refresh_cache_with(&request, |_| pb.inc(1));
            pb.finish_and_clear();

            display_refresh_report(&report);
            if report.failed().next().is_some() && report.succeeded().next().is_none() {
                anyhow::bail!("No cache group could be refreshed");
            }
        }
        Command::Clear { entity } => {
            let removed = opgg.clear_cache(entity, args.lang)?;
            display_success(&format!("Removed {} cached entries", removed));
        }
        Command::Stats => {
            display_info(&format!("Cache file: {}", opgg.config().cache_path.display()));
            display_cache_stats(&opgg.get_cache_stats()?);
        }
        Command::Search { riot_ids, region } => {
            let results = opgg
                .search(&riot_ids, region)
                .with_context(|| format!("Search for '{}' failed", riot_ids))?;
            display_search_results(&results);
        }
        Command::Summoner {
            summoner_id,
            region,
        } => {
            let profile = opgg
                .get_summoner(&summoner_id, region)
                .with_context(|| format!("Could not load summoner {}", summoner_id))?;
            let champions = opgg
                .get_all_champions(Some(language), false)
                .unwrap_or_default();
            display_summoner(&profile, &champions);
        }
        Command::Games {
            summoner_id,
            region,
            limit,
            game_type,
        } => {
            let games = opgg
                .recent_games(&summoner_id, region, limit.min(20), game_type)
                .with_context(|| format!("Could not load games for {}", summoner_id))?;
            // Names are only decoration here; a failed champion lookup is not an error.
            let champions = opgg
                .get_all_champions(Some(language), false)
                .unwrap_or_default();
            display_games(&games, &champions);
        }
    }

    Ok(())
}
