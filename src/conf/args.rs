use std::error::Error;

use clap::Parser;

use crate::conf::external::ExternalConfig;

#[derive(Parser, Debug)]
#[clap(name = "sql2csv")]
#[clap(version = "0.1")]
#[clap(about = "Execute a query against a database and output the results as CSV", long_about = None)]
pub struct SqlCsvArgs {
    /// The query to execute. If not provided, the query will be read from stdin
    #[clap(short, long)]
    pub execute: Option<String>,

    /// Database username
    #[clap(short, long, env = "MYSQL_USER")]
    pub user: Option<String>,

    /// Database password
    #[clap(short, long, env = "MYSQL_PASSWORD")]
    pub password: Option<String>,

    /// Database host
    #[clap(long, env = "MYSQL_HOST")]
    pub host: Option<String>,

    /// Database port
    #[clap(short = 'P', long, env = "MYSQL_PORT")]
    pub port: Option<u16>,

    /// ODBC driver name used to build the connection string
    #[clap(long, env = "ODBC_DRIVER")]
    pub driver: Option<String>,

    /// Do not output the column names as the first row
    #[clap(long)]
    pub no_header: bool,

    /// The file to write the output to. If not provided, the output will be
    /// written to stdout. Add %d to create one file per result set, with the
    /// zero-based result set number in the filename. %0Nd left-pads the number
    /// with zeros to N digits, e.g. -o output-%03d.csv will create files
    /// output-000.csv, output-001.csv, etc.
    #[clap(short, long)]
    pub output: Option<String>,

    /// Yaml config file to use for default values
    /// command line options still override conf values
    #[clap(short, long)]
    pub conf: Option<String>,

    /// Database name
    #[clap(env = "MYSQL_DATABASE")]
    pub database: Option<String>,
}

impl SqlCsvArgs {
    pub fn get_external_conf(&self) -> Result<ExternalConfig, Box<dyn Error>> {
        if self.conf.is_some() {
            let pc = ExternalConfig::from_yaml_file(self.conf.as_ref().unwrap().as_str())?;
            Ok(pc)
        } else {
            Ok(ExternalConfig::empty())
        }
    }
}
