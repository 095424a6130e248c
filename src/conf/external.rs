use crate::DynError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufReader;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalConfig {
    pub execute: Option<String>,

    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub driver: Option<String>,
    pub database: Option<String>,

    pub output: Option<String>,
    pub no_header: Option<bool>,
}

impl ExternalConfig {
    pub fn from_yaml_file(fname: &str) -> Result<ExternalConfig, DynError> {
        let rdr = BufReader::new(fs::File::open(fname)?);
        match serde_yaml::from_reader(rdr) {
            Ok(pc) => Ok(pc),
            Err(e) => Err(Box::new(e)),
        }
    }

    pub fn empty() -> Self {
        Self {
            execute: None,
            user: None,
            password: None,
            host: None,
            port: None,
            driver: None,
            database: None,
            output: None,
            no_header: None,
        }
    }
}
