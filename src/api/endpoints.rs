// op.gg hosts; metadata is split between the champion and summoner services.
// Query parameters are added by the client so ureq can encode them.

pub const CHAMPION_API: &str = "https://lol-api-champion.op.gg/api";
pub const SUMMONER_API: &str = "https://lol-api-summoner.op.gg/api";

pub fn champions() -> String {
    format!("{}/meta/champions", CHAMPION_API)
}

pub fn versions() -> String {
    format!("{}/meta/versions", CHAMPION_API)
}

pub fn seasons() -> String {
    format!("{}/meta/seasons", SUMMONER_API)
}

pub fn keywords() -> String {
    format!("{}/meta/keywords", SUMMONER_API)
}

pub fn summoner_search(region: &str) -> String {
    format!("{}/v3/{}/summoners", SUMMONER_API, region)
}

pub fn summoner_summary(region: &str, summoner_id: &str) -> String {
    format!("{}/{}/summoners/{}/summary", SUMMONER_API, region, summoner_id)
}

pub fn recent_games(region: &str, summoner_id: &str) -> String {
    format!("{}/{}/summoners/{}/games", SUMMONER_API, region, summoner_id)
}
