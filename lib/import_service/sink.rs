use std::sync::Arc;

use diesel::insert_into;
use diesel::prelude::*;
use diesel_async::pooled_connection::deadpool::{Pool, PoolError};
use diesel_async::RunQueryDsl;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::bgg_client::{GameRecord, LinkKind};
use crate::db::models;
use crate::db::schema::{
    bg_alt_game_name, bg_artist, bg_artist_to_game, bg_category, bg_category_to_game, bg_designer,
    bg_designer_to_game, bg_family, bg_family_to_game, bg_game, bg_game_to_expansion, bg_mechanic,
    bg_mechanic_to_game, bg_publisher, bg_publisher_to_game, bg_ranked_list,
    bg_ranked_list_to_game,
};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Query(#[from] diesel::result::Error),
}

/// Persists one record and all of its relationships.
///
/// Every write uses insert-if-absent semantics, so reprocessing the same id
/// after a partial failure never duplicates data. This is intentionally
/// abstracted so scheduler behavior around persistence failures can be tested
/// without a Postgres instance.
pub trait RecordSink: Send + Sync {
    fn save<'a>(&'a self, record: &'a GameRecord) -> BoxFuture<'a, Result<(), SinkError>>;
}

impl<T> RecordSink for Arc<T>
where
    T: RecordSink + ?Sized,
{
    fn save<'a>(&'a self, record: &'a GameRecord) -> BoxFuture<'a, Result<(), SinkError>> {
        (**self).save(record)
    }
}

/// Postgres-backed sink used by the production runtime.
pub struct PgRecordSink {
    pool: Pool<diesel_async::AsyncPgConnection>,
}

impl PgRecordSink {
    pub fn new(pool: Pool<diesel_async::AsyncPgConnection>) -> Self {
        Self { pool }
    }
}

impl RecordSink for PgRecordSink {
    fn save<'a>(&'a self, record: &'a GameRecord) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async move {
            let mut conn = self.pool.get().await?;

            let game_row = models::GameRow::from(record);
            insert_into(bg_game::dsl::bg_game)
                .values(&game_row)
                .on_conflict(bg_game::id)
                .do_nothing()
                .execute(&mut conn)
                .await?;

            let name_rows: Vec<models::AltGameNameRow> = record
                .names
                .iter()
                .map(|name| models::AltGameNameRow {
                    game_id: record.id,
                    name: name.value.clone(),
                    type_: name.name_type.clone(),
                })
                .collect();
            if !name_rows.is_empty() {
                insert_into(bg_alt_game_name::dsl::bg_alt_game_name)
                    .values(&name_rows)
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await?;
            }

            for rank in &record.ranks {
                insert_into(bg_ranked_list::dsl::bg_ranked_list)
                    .values(&models::RankedListRow {
                        id: rank.list_id,
                        name: rank.name.clone(),
                        friendly_name: rank.friendly_name.clone(),
                        type_: rank.rank_type.clone(),
                    })
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await?;
                insert_into(bg_ranked_list_to_game::dsl::bg_ranked_list_to_game)
                    .values(&models::RankedListToGameRow {
                        ranked_list_id: rank.list_id,
                        game_id: record.id,
                        rank: rank.value,
                    })
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await?;
            }

            for link in &record.links {
                match link.kind {
                    LinkKind::Designer => {
                        insert_into(bg_designer::dsl::bg_designer)
                            .values(&models::DesignerRow {
                                id: link.target_id,
                                name: link.value.clone(),
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                        insert_into(bg_designer_to_game::dsl::bg_designer_to_game)
                            .values(&models::DesignerToGameRow {
                                designer_id: link.target_id,
                                game_id: record.id,
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                    }
                    LinkKind::Artist => {
                        insert_into(bg_artist::dsl::bg_artist)
                            .values(&models::ArtistRow {
                                id: link.target_id,
                                name: link.value.clone(),
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                        insert_into(bg_artist_to_game::dsl::bg_artist_to_game)
                            .values(&models::ArtistToGameRow {
                                artist_id: link.target_id,
                                game_id: record.id,
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                    }
                    LinkKind::Publisher => {
                        insert_into(bg_publisher::dsl::bg_publisher)
                            .values(&models::PublisherRow {
                                id: link.target_id,
                                name: link.value.clone(),
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                        insert_into(bg_publisher_to_game::dsl::bg_publisher_to_game)
                            .values(&models::PublisherToGameRow {
                                publisher_id: link.target_id,
                                game_id: record.id,
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                    }
                    LinkKind::Mechanic => {
                        insert_into(bg_mechanic::dsl::bg_mechanic)
                            .values(&models::MechanicRow {
                                id: link.target_id,
                                name: link.value.clone(),
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                        insert_into(bg_mechanic_to_game::dsl::bg_mechanic_to_game)
                            .values(&models::MechanicToGameRow {
                                mechanic_id: link.target_id,
                                game_id: record.id,
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                    }
                    LinkKind::Category => {
                        insert_into(bg_category::dsl::bg_category)
                            .values(&models::CategoryRow {
                                id: link.target_id,
                                name: link.value.clone(),
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                        insert_into(bg_category_to_game::dsl::bg_category_to_game)
                            .values(&models::CategoryToGameRow {
                                category_id: link.target_id,
                                game_id: record.id,
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                    }
                    LinkKind::Family => {
                        insert_into(bg_family::dsl::bg_family)
                            .values(&models::FamilyRow {
                                id: link.target_id,
                                name: link.value.clone(),
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                        insert_into(bg_family_to_game::dsl::bg_family_to_game)
                            .values(&models::FamilyToGameRow {
                                family_id: link.target_id,
                                game_id: record.id,
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                    }
                    LinkKind::Expansion => {
                        insert_into(bg_game_to_expansion::dsl::bg_game_to_expansion)
                            .values(&models::GameExpansionRow {
                                game_id: record.id,
                                expansion_id: link.target_id,
                            })
                            .on_conflict_do_nothing()
                            .execute(&mut conn)
                            .await?;
                    }
                }
            }

            Ok(())
        })
    }
}
