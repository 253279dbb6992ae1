use colored::*;
use opgg_client::accessor::RefreshReport;
use opgg_client::api::models::{
    Champion, GameSummary, Keyword, SeasonMeta, SummonerProfile, SummonerSearchResult,
};
use opgg_client::cache::CacheStats;
use opgg_client::params::Language;
use std::collections::HashMap;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ChampionRow {
    id: u32,
    key: String,
    name: String,
    passive: String,
    spells: String,
}

#[derive(Tabled)]
struct SeasonRow {
    id: u32,
    season: String,
    split: String,
    preseason: String,
}

#[derive(Tabled)]
struct KeywordRow {
    keyword: String,
    label: String,
    op: String,
}

#[derive(Tabled)]
struct StatsRow {
    entity: String,
    language: String,
    entries: usize,
    oldest: String,
    newest: String,
    status: String,
}

#[derive(Tabled)]
struct SummonerRow {
    #[tabled(rename = "Riot ID")]
    riot_id: String,
    level: u32,
    #[tabled(rename = "Summoner ID")]
    summoner_id: String,
}

#[derive(Tabled)]
struct LeagueRow {
    queue: String,
    tier: String,
    record: String,
    win_rate: String,
}

#[derive(Tabled)]
struct MostPlayedRow {
    champion: String,
    games: u32,
    win_rate: String,
    kda: String,
}

#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "#")]
    number: String,
    champion: String,
    result: String,
    kda: String,
    queue: String,
    length: String,
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn heading(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
}

pub fn display_champions(champions: &[Champion], language: Language) {
    heading(&format!("Champions ({}, {})", champions.len(), language));

    if champions.is_empty() {
        println!("{}", "No champions matched".yellow());
        return;
    }

    let rows = champions
        .iter()
        .map(|c| ChampionRow {
            id: c.id,
            key: c.key.clone(),
            name: c.name.clone(),
            passive: c.passive.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            spells: c
                .spells
                .iter()
                .map(|s| format!("{}: {}", s.key, s.name))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    print_table(rows);
}

pub fn display_seasons(seasons: &[SeasonMeta]) {
    heading("Seasons");

    let rows = seasons
        .iter()
        .map(|s| SeasonRow {
            id: s.id,
            season: if s.display_value.is_empty() {
                s.season.to_string()
            } else {
                s.display_value.clone()
            },
            split: s.split.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            preseason: if s.is_preseason { "yes".to_string() } else { String::new() },
        })
        .collect();
    print_table(rows);
}

pub fn display_versions(versions: &[String]) {
    heading("Game Versions");

    for (idx, version) in versions.iter().enumerate() {
        if idx == 0 {
            println!("  {} {}", version.bold().green(), "(current)".dimmed());
        } else {
            println!("  {}", version);
        }
    }
    println!();
}

pub fn display_keywords(keywords: &[Keyword], language: Language) {
    heading(&format!("Keywords ({})", language));

    let rows = keywords
        .iter()
        .map(|k| KeywordRow {
            keyword: k.keyword.clone(),
            label: k.label.clone().unwrap_or_default(),
            op: match k.is_op {
                Some(true) => "OP".red().to_string(),
                _ => String::new(),
            },
        })
        .collect();
    print_table(rows);
}

pub fn display_cache_stats(stats: &CacheStats) {
    heading("Cache Status");

    if stats.groups.is_empty() {
        println!("{}", "Cache is empty".yellow());
        return;
    }

    let rows = stats
        .groups
        .iter()
        .map(|g| StatsRow {
            entity: g.entity_type.to_string(),
            language: if g.lang_code.is_empty() {
                "-".to_string()
            } else {
                g.lang_code.clone()
            },
            entries: g.entry_count,
            oldest: g
                .oldest
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            newest: g
                .newest
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            status: if g.is_stale {
                "stale".yellow().to_string()
            } else {
                "fresh".green().to_string()
            },
        })
        .collect();
    print_table(rows);

    println!("\n{} {}\n", "Total entries:".bold(), stats.total_entries());
}

pub fn display_refresh_report(report: &RefreshReport) {
    heading("Cache Refresh");

    for group in &report.groups {
        let lang = group.language.map(Language::code).unwrap_or("-");
        match &group.result {
            Ok(count) => println!(
                "  {} {} [{}]: {} items",
                "✓".green(),
                group.entity_type,
                lang,
                count
            ),
            Err(e) => println!("  {} {} [{}]: {}", "✗".red(), group.entity_type, lang, e),
        }
    }

    let failed = report.failed().count();
    if failed > 0 {
        println!(
            "\n{}",
            format!("{} of {} groups failed to refresh", failed, report.groups.len()).yellow()
        );
    }
    println!();
}

pub fn display_search_results(results: &[SummonerSearchResult]) {
    heading("Summoner Search");

    if results.is_empty() {
        println!("{}", "No summoners found".yellow());
        return;
    }

    let rows = results
        .iter()
        .map(|r| SummonerRow {
            riot_id: format!("{}#{}", r.game_name, r.tagline),
            level: r.level,
            summoner_id: r.summoner_id.clone(),
        })
        .collect();
    print_table(rows);
}

pub fn display_summoner(profile: &SummonerProfile, champions: &[Champion]) {
    heading(&format!("{} (level {})", profile.riot_id(), profile.level));

    if profile.league_stats.is_empty() {
        println!("{}", "No ranked queues played".yellow());
    } else {
        let rows = profile
            .league_stats
            .iter()
            .map(|l| LeagueRow {
                queue: if l.queue_info.queue_translate.is_empty() {
                    l.queue_info.game_type.clone()
                } else {
                    l.queue_info.queue_translate.clone()
                },
                tier: l.tier_info.label(),
                record: format!("{}W {}L", l.win, l.lose),
                win_rate: format!("{:.1}%", l.win_rate() * 100.0),
            })
            .collect();
        print_table(rows);
    }

    if !profile.previous_seasons.is_empty() {
        println!("\n{}", "Previous Seasons".bold().yellow());
        for season in &profile.previous_seasons {
            println!("  S{} {}", season.season_id, season.tier_info.label());
        }
    }

    let most_played = profile
        .most_champions
        .as_ref()
        .map(|m| m.champion_stats.as_slice())
        .unwrap_or_default();
    if !most_played.is_empty() {
        let names: HashMap<u32, &str> = champions.iter().map(|c| (c.id, c.name.as_str())).collect();
        println!("\n{}", "Most Played".bold().yellow());
        let rows = most_played
            .iter()
            .map(|c| MostPlayedRow {
                champion: names
                    .get(&c.id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("#{}", c.id)),
                games: c.play,
                win_rate: match c.play {
                    0 => "-".to_string(),
                    play => format!("{:.1}%", c.win as f64 / play as f64 * 100.0),
                },
                kda: format!("{:.2}", c.kda()),
            })
            .collect();
        print_table(rows);
    }
    println!();
}

pub fn display_games(games: &[GameSummary], champions: &[Champion]) {
    let names: HashMap<u32, &str> = champions.iter().map(|c| (c.id, c.name.as_str())).collect();
    let total = games.len();
    let wins = games.iter().filter(|g| g.won()).count();

    heading(&format!("Recent Games (Last {})", total));

    if total == 0 {
        println!("{}", "No games found".yellow());
        return;
    }

    println!(
        "{} {} W / {} L ({:.1}% WR)\n",
        "Overall:".bold(),
        wins.to_string().green(),
        (total - wins).to_string().red(),
        wins as f64 / total as f64 * 100.0
    );

    let rows = games
        .iter()
        .enumerate()
        .map(|(idx, g)| {
            let stats = &g.myself.stats;
            GameRow {
                number: (idx + 1).to_string(),
                champion: names
                    .get(&g.myself.champion_id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("#{}", g.myself.champion_id)),
                result: if g.won() {
                    "WIN".green().to_string()
                } else {
                    "LOSS".red().to_string()
                },
                kda: format!("{}/{}/{}", stats.kill, stats.death, stats.assist),
                queue: g
                    .queue
                    .as_ref()
                    .map(|q| q.game_type.clone())
                    .unwrap_or_default(),
                length: format!("{}:{:02}", g.game_length_second / 60, g.game_length_second % 60),
            }
        })
        .collect();
    print_table(rows);
    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
