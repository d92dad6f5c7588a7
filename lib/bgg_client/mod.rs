//! Client for the board game XMLv2 API.
//!
//! WARNING: when requesting a batch, the upstream rejects the entire batch if
//! at least one item in it is a deleted record. Callers must treat any error
//! from here as covering the whole request.

pub mod record;

pub use record::{GameLink, GameName, GameRank, GameRecord, GameStats, LinkKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BggClientErr {
    #[error("ConnectError: {0}")]
    ConnectError(String),

    #[error("ParseError: {0}")]
    ParseError(String),

    #[error("XmlError: {0}")]
    XmlError(#[from] roxmltree::Error),

    #[error("RequestError: {0}")]
    RequestError(#[from] reqwest::Error),
}

pub struct BggClient {
    client: reqwest::Client,
    base_url: String,
}

impl BggClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Downloads data on a batch of records.
    ///
    /// The response contains a record for each requested id the upstream
    /// knows about; ids it does not know are simply absent. Any transport,
    /// status, or parse problem is returned as one error for the whole batch.
    pub async fn fetch_things(&self, ids: &[i64]) -> Result<Vec<GameRecord>, BggClientErr> {
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/thing?type=boardgame&stats=1&id={}",
            self.base_url, joined
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BggClientErr::ConnectError(format!(
                "Received unexpected status code for batch request: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        record::parse_things(&body)
    }

    /// Fetches a single record. See [`BggClient::fetch_things`].
    pub async fn fetch_thing(&self, id: i64) -> Result<Option<GameRecord>, BggClientErr> {
        let records = self.fetch_things(&[id]).await?;
        Ok(records.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::record::parse_things;
    use super::{BggClientErr, LinkKind};

    const SAMPLE_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://example.invalid/xmlapi/termsofuse">
  <item type="boardgame" id="266192">
    <thumbnail>https://cf.example.invalid/thumb.jpg</thumbnail>
    <image>https://cf.example.invalid/full.jpg</image>
    <name type="primary" sortindex="1" value="Wingspan"/>
    <name type="alternate" sortindex="1" value="Fl&#252;gelschlag"/>
    <description>A competitive bird-collection engine builder.</description>
    <yearpublished value="2019"/>
    <minplayers value="1"/>
    <maxplayers value="5"/>
    <playingtime value="70"/>
    <minplaytime value="40"/>
    <maxplaytime value="70"/>
    <minage value="10"/>
    <link type="boardgamecategory" id="1089" value="Animals"/>
    <link type="boardgamemechanic" id="2041" value="Card Drafting"/>
    <link type="boardgamedesigner" id="102979" value="Elizabeth Hargrave"/>
    <link type="boardgameexpansion" id="290837" value="Wingspan: European Expansion"/>
    <link type="boardgameintegration" id="999999" value="Something Unsupported"/>
    <statistics page="1">
      <ratings>
        <usersrated value="70571"/>
        <average value="8.09"/>
        <bayesaverage value="7.89"/>
        <ranks>
          <rank type="subtype" id="1" name="boardgame" friendlyname="Board Game Rank" value="23" bayesaverage="7.89"/>
          <rank type="family" id="5499" name="familygames" friendlyname="Family Game Rank" value="Not Ranked" bayesaverage="Not Ranked"/>
        </ranks>
        <stddev value="1.33"/>
        <median value="0"/>
        <owned value="101306"/>
        <trading value="792"/>
        <wanting value="1569"/>
        <wishing value="13127"/>
        <numcomments value="8323"/>
      </ratings>
    </statistics>
  </item>
</items>"#;

    #[test]
    fn parses_a_full_item() {
        let records = parse_things(SAMPLE_RESPONSE).expect("sample response should parse");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id, 266192);
        assert_eq!(record.thing_type, "boardgame");
        assert_eq!(record.name.as_deref(), Some("Wingspan"));
        assert_eq!(record.names.len(), 2);
        assert_eq!(record.year_published, 2019);
        assert_eq!(record.min_players, 1);
        assert_eq!(record.max_players, 5);
        assert_eq!(record.play_time, 70);
        assert_eq!(record.min_age, 10);
        assert_eq!(record.stats.users_rated, 70571);
        assert!((record.stats.average - 8.09).abs() < f64::EPSILON);
        assert_eq!(record.stats.owned, 101306);
    }

    #[test]
    fn skips_unknown_link_types() {
        let records = parse_things(SAMPLE_RESPONSE).expect("sample response should parse");
        let kinds: Vec<LinkKind> = records[0].links.iter().map(|link| link.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LinkKind::Category,
                LinkKind::Mechanic,
                LinkKind::Designer,
                LinkKind::Expansion
            ]
        );
    }

    #[test]
    fn maps_not_ranked_to_none() {
        let records = parse_things(SAMPLE_RESPONSE).expect("sample response should parse");
        let ranks = &records[0].ranks;
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[0].value, Some(23));
        assert_eq!(ranks[0].friendly_name, "Board Game Rank");
        assert_eq!(ranks[1].value, None);
    }

    #[test]
    fn rejects_non_items_document() {
        let err = parse_things("<error><message>Rate limit exceeded.</message></error>")
            .expect_err("error document should be rejected");
        assert!(matches!(err, BggClientErr::ParseError(_)));
    }

    #[test]
    fn rejects_unparseable_xml() {
        let err = parse_things("<items><item").expect_err("truncated body should be rejected");
        assert!(matches!(err, BggClientErr::XmlError(_)));
    }

    #[test]
    fn rejects_item_missing_required_scalars() {
        let body = r#"<items><item type="boardgame" id="42"><name type="primary" value="Broken"/></item></items>"#;
        let err = parse_things(body).expect_err("item without yearpublished should be rejected");
        assert!(matches!(err, BggClientErr::ParseError(_)));
    }

    #[test]
    fn empty_items_document_yields_no_records() {
        let records = parse_things(r#"<items termsofuse="x"></items>"#)
            .expect("empty items document should parse");
        assert!(records.is_empty());
    }
}
