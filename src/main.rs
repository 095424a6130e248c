use std::error::Error;
use std::io::{self, Write};

use clap::Parser;
use odbc_api::Environment;

pub use conf::*;

use crate::db::{DbError, OdbcResultSets};
use crate::exporter::export;
use crate::output::SinkResolver;

mod conf;
mod db;
mod exporter;
mod output;

pub type DynError = Box<dyn Error>;
pub type DynBoxWrite = Box<dyn Write>;

fn run(args: SqlCsvArgs) -> Result<(), DynError> {
    let conf = SqlCsvConfig::new(args)?;
    let env = Environment::new()?;
    let conn = env
        .connect_with_connection_string(&conf.connection_string())
        .map_err(|e| DbError::connect(&conf.redacted_connection_string(), &e))?;
    let mut result_sets =
        OdbcResultSets::new(&conn, conf.query(), &conf.redacted_connection_string());
    let mut resolver = SinkResolver::new(conf.output_template(), Box::new(io::stdout()));
    export(&mut result_sets, &mut resolver, conf.no_header())
}

fn main() {
    env_logger::init();
    let args = SqlCsvArgs::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[test]
fn verify_app() {
    use clap::CommandFactory;
    SqlCsvArgs::command().debug_assert()
}
