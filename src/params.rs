use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// The four cached metadata categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Champion,
    Season,
    Version,
    Keyword,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Champion,
        EntityType::Season,
        EntityType::Version,
        EntityType::Keyword,
    ];

    /// Champions and keywords are localized; seasons and versions are not.
    pub fn is_language_scoped(self) -> bool {
        matches!(self, EntityType::Champion | EntityType::Keyword)
    }

    /// Drops the language for entity types that are not localized.
    pub fn scope(self, language: Option<Language>) -> Option<Language> {
        if self.is_language_scoped() {
            language
        } else {
            None
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            EntityType::Champion => "champions",
            EntityType::Season => "seasons",
            EntityType::Version => "versions",
            EntityType::Keyword => "keywords",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Champion => "champion",
            EntityType::Season => "season",
            EntityType::Version => "version",
            EntityType::Keyword => "keyword",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "champion" | "champions" => Ok(EntityType::Champion),
            "season" | "seasons" => Ok(EntityType::Season),
            "version" | "versions" => Ok(EntityType::Version),
            "keyword" | "keywords" => Ok(EntityType::Keyword),
            other => Err(AppError::ConfigError(format!(
                "Unknown cache type '{}'",
                other
            ))),
        }
    }
}

/// Language codes accepted by the `hl` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Language {
    #[default]
    English,
    Korean,
    Japanese,
    French,
    German,
    Spanish,
    Portuguese,
    ChineseSimplified,
    ChineseTraditional,
    Russian,
    Turkish,
    Polish,
    Italian,
    Vietnamese,
    Thai,
    Indonesian,
}

impl Language {
    pub const ALL: [Language; 16] = [
        Language::English,
        Language::Korean,
        Language::Japanese,
        Language::French,
        Language::German,
        Language::Spanish,
        Language::Portuguese,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::Russian,
        Language::Turkish,
        Language::Polish,
        Language::Italian,
        Language::Vietnamese,
        Language::Thai,
        Language::Indonesian,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en_US",
            Language::Korean => "ko_KR",
            Language::Japanese => "ja_JP",
            Language::French => "fr_FR",
            Language::German => "de_DE",
            Language::Spanish => "es_ES",
            Language::Portuguese => "pt_BR",
            Language::ChineseSimplified => "zh_CN",
            Language::ChineseTraditional => "zh_TW",
            Language::Russian => "ru_RU",
            Language::Turkish => "tr_TR",
            Language::Polish => "pl_PL",
            Language::Italian => "it_IT",
            Language::Vietnamese => "vi_VN",
            Language::Thai => "th_TH",
            Language::Indonesian => "id_ID",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| AppError::ConfigError(format!("Unknown language code '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    Na,
    Euw,
    Eune,
    Kr,
    Jp,
    Br,
    Lan,
    Las,
    Oce,
    Ru,
    Tr,
}

impl Region {
    /// Path segment used by the summoner API.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Na => "na",
            Region::Euw => "euw",
            Region::Eune => "eune",
            Region::Kr => "kr",
            Region::Jp => "jp",
            Region::Br => "br",
            Region::Lan => "lan",
            Region::Las => "las",
            Region::Oce => "oce",
            Region::Ru => "ru",
            Region::Tr => "tr",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "na" | "na1" => Ok(Region::Na),
            "euw" | "euw1" => Ok(Region::Euw),
            "eune" | "eun1" => Ok(Region::Eune),
            "kr" => Ok(Region::Kr),
            "jp" | "jp1" => Ok(Region::Jp),
            "br" | "br1" => Ok(Region::Br),
            "lan" | "la1" => Ok(Region::Lan),
            "las" | "la2" => Ok(Region::Las),
            "oce" | "oc1" => Ok(Region::Oce),
            "ru" => Ok(Region::Ru),
            "tr" | "tr1" => Ok(Region::Tr),
            other => Err(AppError::ConfigError(format!("Unknown region '{}'", other))),
        }
    }
}

/// Match history filter for the games endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameType {
    #[default]
    Total,
    Ranked,
    Normal,
}

impl GameType {
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Total => "total",
            GameType::Ranked => "ranked",
            GameType::Normal => "normal",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" | "all" => Ok(GameType::Total),
            "ranked" => Ok(GameType::Ranked),
            "normal" => Ok(GameType::Normal),
            other => Err(AppError::ConfigError(format!("Unknown game type '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parses_codes_loosely() {
        assert_eq!("ko_KR".parse::<Language>().unwrap(), Language::Korean);
        assert_eq!("en-us".parse::<Language>().unwrap(), Language::English);
        assert!("xx_XX".parse::<Language>().is_err());
    }

    #[test]
    fn test_scope_drops_language_for_global_entities() {
        let lang = Some(Language::Korean);
        assert_eq!(EntityType::Champion.scope(lang), lang);
        assert_eq!(EntityType::Keyword.scope(lang), lang);
        assert_eq!(EntityType::Season.scope(lang), None);
        assert_eq!(EntityType::Version.scope(lang), None);
    }

    #[test]
    fn test_region_accepts_platform_ids() {
        assert_eq!("NA1".parse::<Region>().unwrap(), Region::Na);
        assert_eq!("euw".parse::<Region>().unwrap(), Region::Euw);
        assert!("mars".parse::<Region>().is_err());
    }

    #[test]
    fn test_game_type_round_trips_through_str() {
        assert_eq!("RANKED".parse::<GameType>().unwrap(), GameType::Ranked);
        assert_eq!("all".parse::<GameType>().unwrap(), GameType::Total);
        assert_eq!(GameType::default().as_str(), "total");
        assert!("aram".parse::<GameType>().is_err());
    }
}
