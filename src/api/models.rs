use serde::{Deserialize, Serialize};

// Every op.gg endpoint wraps its body in `{"data": ...}`
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// /meta/champions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub id: u32,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub passive: Option<Passive>,
    #[serde(default)]
    pub spells: Vec<Spell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passive {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub max_rank: u32,
    #[serde(default)]
    pub image_url: String,
}

// /meta/seasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonMeta {
    pub id: u32,
    #[serde(alias = "value")]
    pub season: u32,
    #[serde(default)]
    pub display_value: String,
    #[serde(default)]
    pub split: Option<u32>,
    #[serde(default)]
    pub is_preseason: bool,
}

// /meta/versions returns bare strings; wrapped so it can sit in the payload union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVersion {
    pub version: String,
}

impl From<String> for GameVersion {
    fn from(version: String) -> Self {
        GameVersion { version }
    }
}

// /meta/keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arrows: Vec<String>,
    #[serde(default)]
    pub is_op: Option<bool>,
    #[serde(default)]
    pub context: Option<String>,
}

// Upstream occasionally ships keyword rows without a key; those are dropped
#[derive(Debug, Deserialize)]
pub struct RawKeyword {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arrows: Vec<String>,
    #[serde(default)]
    pub is_op: Option<bool>,
    #[serde(default)]
    pub context: Option<String>,
}

impl RawKeyword {
    pub fn into_keyword(self) -> Option<Keyword> {
        let keyword = self.keyword.filter(|k| !k.is_empty())?;
        Some(Keyword {
            keyword,
            label: self.label,
            description: self.description,
            arrows: self.arrows,
            is_op: self.is_op,
            context: self.context,
        })
    }
}

// /v3/{region}/summoners?riot_id=
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummonerSearchResult {
    pub summoner_id: String,
    pub game_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub profile_image_url: String,
}

// /{region}/summoners/{summoner_id}/games
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub game_map: String,
    #[serde(default)]
    pub queue: Option<QueueInfo>,
    #[serde(default)]
    pub game_length_second: u32,
    pub myself: GameParticipant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueInfo {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub queue_translate: String,
    #[serde(default)]
    pub game_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameParticipant {
    pub champion_id: u32,
    #[serde(default)]
    pub stats: ParticipantStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantStats {
    #[serde(default)]
    pub kill: u32,
    #[serde(default)]
    pub death: u32,
    #[serde(default)]
    pub assist: u32,
    #[serde(default)]
    pub result: String,
}

impl GameSummary {
    pub fn won(&self) -> bool {
        self.myself.stats.result.eq_ignore_ascii_case("win")
    }
}

// /{region}/summoners/{summoner_id}/summary, wrapped as `{"data": {"summoner": ...}}`
#[derive(Debug, Deserialize)]
pub struct SummaryEnvelope {
    pub summoner: SummonerProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummonerProfile {
    pub summoner_id: String,
    pub game_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub renewable_at: Option<String>,
    #[serde(default)]
    pub previous_seasons: Vec<PreviousSeason>,
    #[serde(default)]
    pub league_stats: Vec<LeagueStats>,
    #[serde(default)]
    pub most_champions: Option<MostChampions>,
}

impl SummonerProfile {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tagline)
    }
}

// Unranked queues come back with null tier fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierInfo {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub division: Option<u32>,
    #[serde(default)]
    pub lp: Option<i32>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub tier_image_url: Option<String>,
    #[serde(default)]
    pub border_image_url: Option<String>,
}

impl TierInfo {
    pub fn label(&self) -> String {
        match (&self.tier, self.division, self.lp) {
            (Some(tier), Some(division), Some(lp)) => format!("{} {} ({} LP)", tier, division, lp),
            (Some(tier), _, Some(lp)) => format!("{} ({} LP)", tier, lp),
            (Some(tier), _, None) => tier.clone(),
            _ => "Unranked".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviousSeason {
    pub season_id: u32,
    #[serde(default)]
    pub tier_info: TierInfo,
    #[serde(default)]
    pub rank_entries: Vec<RankEntry>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankEntry {
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub rank_info: Option<TierInfo>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueStats {
    pub queue_info: QueueInfo,
    #[serde(default)]
    pub tier_info: TierInfo,
    #[serde(default)]
    pub win: u32,
    #[serde(default)]
    pub lose: u32,
    #[serde(default)]
    pub is_hot_streak: bool,
    #[serde(default)]
    pub is_fresh_blood: bool,
    #[serde(default)]
    pub is_veteran: bool,
    #[serde(default)]
    pub is_inactive: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl LeagueStats {
    pub fn games(&self) -> u32 {
        self.win + self.lose
    }

    /// Win ratio in `0.0..=1.0`; zero when no games were played.
    pub fn win_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => self.win as f64 / games as f64,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MostChampions {
    #[serde(default)]
    pub champion_stats: Vec<ChampionPlayStats>,
    #[serde(default)]
    pub play: u32,
    #[serde(default)]
    pub win: u32,
    #[serde(default)]
    pub lose: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionPlayStats {
    pub id: u32,
    #[serde(default)]
    pub play: u32,
    #[serde(default)]
    pub win: u32,
    #[serde(default)]
    pub lose: u32,
    #[serde(default)]
    pub kill: u32,
    #[serde(default)]
    pub death: u32,
    #[serde(default)]
    pub assist: u32,
}

impl ChampionPlayStats {
    /// (kills + assists) / deaths, with deathless games counting as one death.
    pub fn kda(&self) -> f64 {
        (self.kill + self.assist) as f64 / self.death.max(1) as f64
    }
}
