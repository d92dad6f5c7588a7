use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Importer daemon for the board game catalog")]
pub struct Cli {
    #[clap(long)]
    /// Comma-separated record ids to import once, bypassing the scheduler
    pub ids: Option<String>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parses the `--ids` flag value into record ids.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',').map(|part| part.trim().parse::<i64>()).collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_id_list, Cli};
    use clap::Parser;

    #[test]
    fn parses_id_list_with_whitespace() {
        let ids = parse_id_list("1, 2,3 ,400").expect("list should parse");
        assert_eq!(ids, vec![1, 2, 3, 400]);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(parse_id_list("1,two,3").is_err());
    }

    #[test]
    fn ids_flag_is_optional() {
        let cli = Cli::try_parse_from(["bgg-importer"]).expect("bare invocation should parse");
        assert!(cli.ids.is_none());

        let cli = Cli::try_parse_from(["bgg-importer", "--ids", "5,6"])
            .expect("--ids invocation should parse");
        assert_eq!(cli.ids.as_deref(), Some("5,6"));
    }
}
