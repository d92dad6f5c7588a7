use roxmltree::Node;

use super::BggClientErr;

/// One parsed record from the upstream `thing` endpoint.
///
/// Carries everything the sink needs to persist the record and its
/// relationships. Parsing is strict about the scalar fields the catalog
/// depends on: a malformed item fails the whole response, which the caller
/// surfaces as an opaque batch failure.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub id: i64,
    pub thing_type: String,
    /// Primary display name, when the upstream marks one.
    pub name: Option<String>,
    pub names: Vec<GameName>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub year_published: i32,
    pub min_players: i32,
    pub max_players: i32,
    pub play_time: i32,
    pub min_age: i32,
    pub stats: GameStats,
    pub ranks: Vec<GameRank>,
    pub links: Vec<GameLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameName {
    pub name_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameStats {
    pub users_rated: i64,
    pub average: f64,
    pub bayes_average: f64,
    pub owned: i64,
    pub trading: i64,
    pub wanting: i64,
    pub wishing: i64,
    pub num_comments: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRank {
    pub list_id: i64,
    pub name: String,
    pub friendly_name: String,
    pub rank_type: String,
    /// `None` when the upstream reports the record as not ranked.
    pub value: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLink {
    pub kind: LinkKind,
    pub target_id: i64,
    pub value: String,
}

/// Taxonomy relationship kinds the sink knows how to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Designer,
    Artist,
    Publisher,
    Mechanic,
    Category,
    Family,
    Expansion,
}

impl LinkKind {
    /// Maps an upstream `link` type attribute; unknown types are skipped.
    fn from_api_str(raw: &str) -> Option<Self> {
        match raw {
            "boardgamedesigner" => Some(Self::Designer),
            "boardgameartist" => Some(Self::Artist),
            "boardgamepublisher" => Some(Self::Publisher),
            "boardgamemechanic" => Some(Self::Mechanic),
            "boardgamecategory" => Some(Self::Category),
            "boardgamefamily" => Some(Self::Family),
            "boardgameexpansion" => Some(Self::Expansion),
            _ => None,
        }
    }
}

/// Parses a full `thing` response body into records.
///
/// The upstream wraps results in an `<items>` document; anything else (its
/// error page included) is a malformed response and rejects the whole batch.
pub(super) fn parse_things(xml: &str) -> Result<Vec<GameRecord>, BggClientErr> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();
    if !root.has_tag_name("items") {
        return Err(BggClientErr::ParseError(format!(
            "unexpected response root <{}>",
            root.tag_name().name()
        )));
    }

    root.children()
        .filter(|node| node.is_element() && node.has_tag_name("item"))
        .map(parse_item)
        .collect()
}

fn parse_item(item: Node) -> Result<GameRecord, BggClientErr> {
    let id = parse_id_attr(item, "id")?;
    let thing_type = item
        .attribute("type")
        .ok_or_else(|| item_error(id, "missing type attribute"))?
        .to_string();

    let thumbnail = child_text(item, "thumbnail");
    let image = child_text(item, "image");
    let description = child_text(item, "description");

    let year_published = scalar_value(item, id, "yearpublished")?;
    let min_players = scalar_value(item, id, "minplayers")?;
    let max_players = scalar_value(item, id, "maxplayers")?;
    let play_time = scalar_value(item, id, "playingtime")?;
    let min_age = scalar_value(item, id, "minage")?;

    let mut name = None;
    let mut names = Vec::new();
    for node in elements_named(item, "name") {
        let name_type = node
            .attribute("type")
            .ok_or_else(|| item_error(id, "name element missing type"))?;
        let value = node
            .attribute("value")
            .ok_or_else(|| item_error(id, "name element missing value"))?;
        if name_type == "primary" {
            name = Some(value.to_string());
        }
        names.push(GameName {
            name_type: name_type.to_string(),
            value: value.to_string(),
        });
    }

    let mut links = Vec::new();
    for node in elements_named(item, "link") {
        let raw_kind = node
            .attribute("type")
            .ok_or_else(|| item_error(id, "link element missing type"))?;
        let Some(kind) = LinkKind::from_api_str(raw_kind) else {
            continue;
        };
        let target_id = parse_id_attr(node, "id")
            .map_err(|_| item_error(id, "link element with unparseable id"))?;
        let value = node
            .attribute("value")
            .ok_or_else(|| item_error(id, "link element missing value"))?
            .to_string();
        links.push(GameLink {
            kind,
            target_id,
            value,
        });
    }

    let ratings = child(item, "statistics")
        .and_then(|stats| child(stats, "ratings"))
        .ok_or_else(|| item_error(id, "missing statistics ratings"))?;
    let stats = GameStats {
        users_rated: scalar_value(ratings, id, "usersrated")?,
        average: scalar_value(ratings, id, "average")?,
        bayes_average: scalar_value(ratings, id, "bayesaverage")?,
        owned: scalar_value(ratings, id, "owned")?,
        trading: scalar_value(ratings, id, "trading")?,
        wanting: scalar_value(ratings, id, "wanting")?,
        wishing: scalar_value(ratings, id, "wishing")?,
        num_comments: scalar_value(ratings, id, "numcomments")?,
    };

    let mut ranks = Vec::new();
    if let Some(ranks_node) = child(ratings, "ranks") {
        for node in elements_named(ranks_node, "rank") {
            let list_id = parse_id_attr(node, "id")
                .map_err(|_| item_error(id, "rank element with unparseable id"))?;
            let rank_type = node
                .attribute("type")
                .ok_or_else(|| item_error(id, "rank element missing type"))?
                .to_string();
            let rank_name = node
                .attribute("name")
                .ok_or_else(|| item_error(id, "rank element missing name"))?
                .to_string();
            let friendly_name = node
                .attribute("friendlyname")
                .ok_or_else(|| item_error(id, "rank element missing friendlyname"))?
                .to_string();
            let value = node
                .attribute("value")
                .ok_or_else(|| item_error(id, "rank element missing value"))?;
            // "Not Ranked" is a legitimate placement, not a parse failure.
            let value = value.parse::<i32>().ok();
            ranks.push(GameRank {
                list_id,
                name: rank_name,
                friendly_name,
                rank_type,
                value,
            });
        }
    }

    Ok(GameRecord {
        id,
        thing_type,
        name,
        names,
        thumbnail,
        image,
        description,
        year_published,
        min_players,
        max_players,
        play_time,
        min_age,
        stats,
        ranks,
        links,
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(name))
}

fn elements_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(name))
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|child| child.text())
        .map(str::to_string)
}

fn parse_id_attr(node: Node, attr: &str) -> Result<i64, BggClientErr> {
    node.attribute(attr)
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| {
            BggClientErr::ParseError(format!(
                "element <{}> missing numeric {attr} attribute",
                node.tag_name().name()
            ))
        })
}

/// Reads the `value` attribute of a named child element, parsed as a number.
fn scalar_value<T: std::str::FromStr>(
    node: Node,
    item_id: i64,
    name: &str,
) -> Result<T, BggClientErr> {
    child(node, name)
        .and_then(|child| child.attribute("value"))
        .and_then(|raw| raw.parse::<T>().ok())
        .ok_or_else(|| item_error(item_id, &format!("missing numeric {name}")))
}

fn item_error(id: i64, detail: &str) -> BggClientErr {
    BggClientErr::ParseError(format!("item {id}: {detail}"))
}
