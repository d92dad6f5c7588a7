//! Offline similarity scoring over imported records.
//!
//! For each record, finds the most similar other records by Jaccard distance
//! over their taxonomy attributes and persists the top matches. The dataset
//! is small enough to hold in memory, so the all-pairs comparison is done
//! in-process rather than in a batch framework.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use diesel::insert_into;
use diesel::prelude::*;
use diesel_async::pooled_connection::deadpool::{Pool, PoolError};
use diesel_async::RunQueryDsl;
use log::info;
use thiserror::Error;

use crate::db::models::{GameAttrRow, GameSimilarRow};
use crate::db::schema::{
    bg_artist_to_game, bg_category_to_game, bg_designer_to_game, bg_family_to_game, bg_game,
    bg_game_attrs, bg_game_similar, bg_mechanic_to_game, bg_publisher_to_game,
};

/// How many similar records to keep per record by default.
pub const DEFAULT_TOP_N: usize = 10;

const INSERT_CHUNK_SIZE: usize = 5000;

#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Query(#[from] diesel::result::Error),
}

/// Calculates the Jaccard index between two attribute sets: the size of the
/// intersection over the size of the union, and 0 when both sets are empty.
pub fn jaccard_index(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Denormalizes every taxonomy membership into `bg_game_attrs` so attribute
/// sets can be loaded with one query instead of six joins per record.
///
/// Attrs are encoded with a kind prefix so ids from different taxonomies
/// never collide: `m_` mechanic, `c_` category, `a_` artist, `d_` designer,
/// `f_` family, `p_` publisher.
pub async fn rebuild_attribute_table(
    pool: &Pool<diesel_async::AsyncPgConnection>,
) -> Result<usize, SimilarityError> {
    let mut conn = pool.get().await?;
    let mut rows: Vec<GameAttrRow> = Vec::new();

    let mechanics: Vec<(i64, i64)> = bg_mechanic_to_game::dsl::bg_mechanic_to_game
        .select((
            bg_mechanic_to_game::mechanic_id,
            bg_mechanic_to_game::game_id,
        ))
        .load(&mut conn)
        .await?;
    rows.extend(mechanics.into_iter().map(|(id, game_id)| GameAttrRow {
        game_id,
        attr: format!("m_{id}"),
    }));

    let categories: Vec<(i64, i64)> = bg_category_to_game::dsl::bg_category_to_game
        .select((
            bg_category_to_game::category_id,
            bg_category_to_game::game_id,
        ))
        .load(&mut conn)
        .await?;
    rows.extend(categories.into_iter().map(|(id, game_id)| GameAttrRow {
        game_id,
        attr: format!("c_{id}"),
    }));

    let artists: Vec<(i64, i64)> = bg_artist_to_game::dsl::bg_artist_to_game
        .select((bg_artist_to_game::artist_id, bg_artist_to_game::game_id))
        .load(&mut conn)
        .await?;
    rows.extend(artists.into_iter().map(|(id, game_id)| GameAttrRow {
        game_id,
        attr: format!("a_{id}"),
    }));

    let designers: Vec<(i64, i64)> = bg_designer_to_game::dsl::bg_designer_to_game
        .select((
            bg_designer_to_game::designer_id,
            bg_designer_to_game::game_id,
        ))
        .load(&mut conn)
        .await?;
    rows.extend(designers.into_iter().map(|(id, game_id)| GameAttrRow {
        game_id,
        attr: format!("d_{id}"),
    }));

    let families: Vec<(i64, i64)> = bg_family_to_game::dsl::bg_family_to_game
        .select((bg_family_to_game::family_id, bg_family_to_game::game_id))
        .load(&mut conn)
        .await?;
    rows.extend(families.into_iter().map(|(id, game_id)| GameAttrRow {
        game_id,
        attr: format!("f_{id}"),
    }));

    let publishers: Vec<(i64, i64)> = bg_publisher_to_game::dsl::bg_publisher_to_game
        .select((
            bg_publisher_to_game::publisher_id,
            bg_publisher_to_game::game_id,
        ))
        .load(&mut conn)
        .await?;
    rows.extend(publishers.into_iter().map(|(id, game_id)| GameAttrRow {
        game_id,
        attr: format!("p_{id}"),
    }));

    for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
        insert_into(bg_game_attrs::dsl::bg_game_attrs)
            .values(chunk)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
    }

    Ok(rows.len())
}

/// Loads all known attributes of all records into memory, keyed by record id.
pub async fn load_attribute_sets(
    pool: &Pool<diesel_async::AsyncPgConnection>,
) -> Result<HashMap<i64, HashSet<String>>, SimilarityError> {
    let mut conn = pool.get().await?;
    let rows: Vec<(i64, String)> = bg_game_attrs::dsl::bg_game_attrs
        .select((bg_game_attrs::game_id, bg_game_attrs::attr))
        .load(&mut conn)
        .await?;

    let mut data: HashMap<i64, HashSet<String>> = HashMap::new();
    for (game_id, attr) in rows {
        data.entry(game_id).or_default().insert(attr);
    }
    Ok(data)
}

/// Ranks attribute matches for one record against every other record,
/// best first, excluding the record itself and zero-score pairs.
pub fn rank_matches(
    id: i64,
    ids: &[i64],
    data: &HashMap<i64, HashSet<String>>,
    top_n: usize,
) -> Vec<(i64, f64)> {
    let empty = HashSet::new();
    let set = data.get(&id).unwrap_or(&empty);

    let mut ratings: Vec<(i64, f64)> = ids
        .iter()
        .filter(|other| **other != id)
        .filter_map(|&other| {
            let score = jaccard_index(set, data.get(&other).unwrap_or(&empty));
            (score > 0.0).then_some((other, score))
        })
        .collect();

    ratings.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ratings.truncate(top_n);
    ratings
}

/// Scores every record against every other record and persists the top
/// matches. Returns the number of similarity rows written.
pub async fn score_similar(
    pool: &Pool<diesel_async::AsyncPgConnection>,
    top_n: usize,
) -> Result<usize, SimilarityError> {
    let mut conn = pool.get().await?;
    let ids: Vec<i64> = bg_game::dsl::bg_game
        .select(bg_game::id)
        .order(bg_game::id.asc())
        .load(&mut conn)
        .await?;
    let data = load_attribute_sets(pool).await?;
    info!(
        "Scoring {} records against {} attribute sets",
        ids.len(),
        data.len()
    );

    let mut written = 0usize;
    for &id in &ids {
        let rows: Vec<GameSimilarRow> = rank_matches(id, &ids, &data, top_n)
            .into_iter()
            .map(|(target, score)| GameSimilarRow {
                game_id: id,
                target_game_id: target,
                match_: score,
            })
            .collect();

        if rows.is_empty() {
            continue;
        }
        insert_into(bg_game_similar::dsl::bg_game_similar)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;
        written += rows.len();
    }

    Ok(written)
}
