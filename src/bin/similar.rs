use clap::Parser;
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use dotenv::dotenv;
use log::info;

use importer_lib::config::Config;
use importer_lib::similarity;

#[derive(Parser, Debug)]
#[command(about = "Offline similarity scoring over imported records")]
struct Cli {
    #[clap(long)]
    /// Rebuild the denormalized attribute table before scoring
    rebuild_attrs: bool,

    #[clap(long, default_value_t = similarity::DEFAULT_TOP_N)]
    /// How many similar records to keep per record
    top: usize,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env().expect("Config incorrectly specified");
    env_logger::init();
    let args = Cli::parse();

    let pool_config =
        AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(&config.db_url);
    let pool = Pool::builder(pool_config)
        .build()
        .expect("Could not establish connection!");

    if args.rebuild_attrs {
        let stored = similarity::rebuild_attribute_table(&pool)
            .await
            .expect("attribute rebuild failed");
        info!("Stored {stored} attribute rows");
    }

    let written = similarity::score_similar(&pool, args.top)
        .await
        .expect("similarity scoring failed");
    info!("Wrote {written} similarity rows");
}
