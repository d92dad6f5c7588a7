use diesel::prelude::*;

use crate::bgg_client::GameRecord;

/// One ledger row recording the latest terminal outcome for a record id.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_imports)]
pub struct ImportRow {
    pub target_id: i64,
    pub type_: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_game)]
pub struct GameRow {
    pub id: i64,
    pub type_: String,
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub min_players: i32,
    pub max_players: i32,
    pub play_time: i32,
    pub year_published: i32,
    pub min_age: i32,
    pub stats_user_rated: i64,
    pub stats_average: f64,
    pub stats_bayes_average: f64,
    pub stats_owned: i64,
    pub stats_trading: i64,
    pub stats_wanting: i64,
    pub stats_wishing: i64,
    pub stats_num_comments: i64,
}

impl From<&GameRecord> for GameRow {
    fn from(record: &GameRecord) -> Self {
        Self {
            id: record.id,
            type_: record.thing_type.clone(),
            name: record.name.clone(),
            thumbnail: record.thumbnail.clone(),
            image: record.image.clone(),
            description: record.description.clone(),
            min_players: record.min_players,
            max_players: record.max_players,
            play_time: record.play_time,
            year_published: record.year_published,
            min_age: record.min_age,
            stats_user_rated: record.stats.users_rated,
            stats_average: record.stats.average,
            stats_bayes_average: record.stats.bayes_average,
            stats_owned: record.stats.owned,
            stats_trading: record.stats.trading,
            stats_wanting: record.stats.wanting,
            stats_wishing: record.stats.wishing,
            stats_num_comments: record.stats.num_comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_alt_game_name)]
pub struct AltGameNameRow {
    pub game_id: i64,
    pub name: String,
    pub type_: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_ranked_list)]
pub struct RankedListRow {
    pub id: i64,
    pub name: String,
    pub friendly_name: String,
    pub type_: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_ranked_list_to_game)]
pub struct RankedListToGameRow {
    pub ranked_list_id: i64,
    pub game_id: i64,
    pub rank: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_designer)]
pub struct DesignerRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_designer_to_game)]
pub struct DesignerToGameRow {
    pub designer_id: i64,
    pub game_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_artist)]
pub struct ArtistRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_artist_to_game)]
pub struct ArtistToGameRow {
    pub artist_id: i64,
    pub game_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_publisher)]
pub struct PublisherRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_publisher_to_game)]
pub struct PublisherToGameRow {
    pub publisher_id: i64,
    pub game_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_mechanic)]
pub struct MechanicRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_mechanic_to_game)]
pub struct MechanicToGameRow {
    pub mechanic_id: i64,
    pub game_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_category)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_category_to_game)]
pub struct CategoryToGameRow {
    pub category_id: i64,
    pub game_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_family)]
pub struct FamilyRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_family_to_game)]
pub struct FamilyToGameRow {
    pub family_id: i64,
    pub game_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_game_to_expansion)]
pub struct GameExpansionRow {
    pub game_id: i64,
    pub expansion_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_game_attrs)]
pub struct GameAttrRow {
    pub game_id: i64,
    pub attr: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Insertable)]
#[diesel(table_name = super::schema::bg_game_similar)]
pub struct GameSimilarRow {
    pub game_id: i64,
    pub target_game_id: i64,
    pub match_: f64,
}
