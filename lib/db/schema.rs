diesel::table! {
    bg_imports (target_id, type_) {
        target_id -> Int8,
        #[sql_name = "type"]
        type_ -> Text,
        result -> Text,
    }
}

diesel::table! {
    bg_game (id) {
        id -> Int8,
        #[sql_name = "type"]
        type_ -> Text,
        name -> Nullable<Text>,
        thumbnail -> Nullable<Text>,
        image -> Nullable<Text>,
        description -> Nullable<Text>,
        min_players -> Int4,
        max_players -> Int4,
        play_time -> Int4,
        year_published -> Int4,
        min_age -> Int4,
        stats_user_rated -> Int8,
        stats_average -> Float8,
        stats_bayes_average -> Float8,
        stats_owned -> Int8,
        stats_trading -> Int8,
        stats_wanting -> Int8,
        stats_wishing -> Int8,
        stats_num_comments -> Int8,
    }
}

diesel::table! {
    bg_alt_game_name (game_id, name, type_) {
        game_id -> Int8,
        name -> Text,
        #[sql_name = "type"]
        type_ -> Text,
    }
}

diesel::table! {
    bg_ranked_list (id) {
        id -> Int8,
        name -> Text,
        friendly_name -> Text,
        #[sql_name = "type"]
        type_ -> Text,
    }
}

diesel::table! {
    bg_ranked_list_to_game (ranked_list_id, game_id) {
        ranked_list_id -> Int8,
        game_id -> Int8,
        rank -> Nullable<Int4>,
    }
}

diesel::table! {
    bg_designer (id) {
        id -> Int8,
        name -> Text,
    }
}

diesel::table! {
    bg_designer_to_game (designer_id, game_id) {
        designer_id -> Int8,
        game_id -> Int8,
    }
}

diesel::table! {
    bg_artist (id) {
        id -> Int8,
        name -> Text,
    }
}

diesel::table! {
    bg_artist_to_game (artist_id, game_id) {
        artist_id -> Int8,
        game_id -> Int8,
    }
}

diesel::table! {
    bg_publisher (id) {
        id -> Int8,
        name -> Text,
    }
}

diesel::table! {
    bg_publisher_to_game (publisher_id, game_id) {
        publisher_id -> Int8,
        game_id -> Int8,
    }
}

diesel::table! {
    bg_mechanic (id) {
        id -> Int8,
        name -> Text,
    }
}

diesel::table! {
    bg_mechanic_to_game (mechanic_id, game_id) {
        mechanic_id -> Int8,
        game_id -> Int8,
    }
}

diesel::table! {
    bg_category (id) {
        id -> Int8,
        name -> Text,
    }
}

diesel::table! {
    bg_category_to_game (category_id, game_id) {
        category_id -> Int8,
        game_id -> Int8,
    }
}

diesel::table! {
    bg_family (id) {
        id -> Int8,
        name -> Text,
    }
}

diesel::table! {
    bg_family_to_game (family_id, game_id) {
        family_id -> Int8,
        game_id -> Int8,
    }
}

diesel::table! {
    bg_game_to_expansion (game_id, expansion_id) {
        game_id -> Int8,
        expansion_id -> Int8,
    }
}

diesel::table! {
    bg_game_attrs (game_id, attr) {
        game_id -> Int8,
        attr -> Text,
    }
}

diesel::table! {
    bg_game_similar (game_id, target_game_id) {
        game_id -> Int8,
        target_game_id -> Int8,
        #[sql_name = "match"]
        match_ -> Float8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    bg_imports,
    bg_game,
    bg_alt_game_name,
    bg_ranked_list,
    bg_ranked_list_to_game,
    bg_designer,
    bg_designer_to_game,
    bg_artist,
    bg_artist_to_game,
    bg_publisher,
    bg_publisher_to_game,
    bg_mechanic,
    bg_mechanic_to_game,
    bg_category,
    bg_category_to_game,
    bg_family,
    bg_family_to_game,
    bg_game_to_expansion,
    bg_game_attrs,
    bg_game_similar,
);
