use crate::conf::external::ExternalConfig;
use crate::output::validate_template;
use crate::{ConfigError, DynError, SqlCsvArgs};
use std::io::{self, IsTerminal, Read};

macro_rules! args_or_external_opt {
    ($a:expr,$b:expr, $prop:ident, $err: expr) => {
        if $a.$prop.is_some() {
            Ok($a.$prop.as_ref().unwrap())
        } else {
            if ($b.$prop.is_some()) {
                Ok($b.$prop.as_ref().unwrap())
            } else {
                let my_err: DynError = Box::new(ConfigError::new($err));
                Err(my_err)
            }
        }
    };
}

macro_rules! args_or_external_opt_default {
    ($a:expr,$b:expr, $prop:ident, $def: expr) => {
        if $a.$prop.is_some() {
            $a.$prop.as_ref().unwrap()
        } else {
            if ($b.$prop.is_some()) {
                $b.$prop.as_ref().unwrap()
            } else {
                $def
            }
        }
    };
}

macro_rules! args_or_external_bool_default {
    ($a:expr,$b:expr, $prop:ident, $def: expr) => {
        if $a.$prop {
            $a.$prop
        } else {
            if ($b.$prop.is_some()) {
                $b.$prop.unwrap()
            } else {
                $def
            }
        }
    };
}

const DEFAULT_DRIVER: &str = "MySQL ODBC 8.0 Unicode Driver";

#[derive(Debug, Clone)]
pub struct SqlCsvConfig {
    query: String,

    user: String,
    password: String,
    host: String,
    port: u16,
    driver: String,
    database: String,

    output_template: String,
    no_header: bool,
}

impl SqlCsvConfig {
    pub fn new(args: SqlCsvArgs) -> Result<SqlCsvConfig, DynError> {
        let external_conf = args.get_external_conf()?;
        let query = Self::resolve_query(&args, &external_conf)?;
        let empty = String::new();
        let default_user = String::from("root");
        let default_host = String::from("127.0.0.1");
        let default_port: u16 = 3306;
        let default_driver = String::from(DEFAULT_DRIVER);
        let user = args_or_external_opt_default!(&args, &external_conf, user, &default_user);
        let password = args_or_external_opt_default!(&args, &external_conf, password, &empty);
        let host = args_or_external_opt_default!(&args, &external_conf, host, &default_host);
        let port = args_or_external_opt_default!(&args, &external_conf, port, &default_port);
        let driver = args_or_external_opt_default!(&args, &external_conf, driver, &default_driver);
        let database = args_or_external_opt!(
            &args,
            &external_conf,
            database,
            "A database must be provided"
        )?;
        let output = args_or_external_opt_default!(&args, &external_conf, output, &empty);
        validate_template(output)?;
        let no_header = args_or_external_bool_default!(&args, &external_conf, no_header, false);
        Ok(Self {
            query,
            user: user.to_string(),
            password: password.to_string(),
            host: host.to_string(),
            port: *port,
            driver: driver.to_string(),
            database: database.to_string(),
            output_template: output.to_string(),
            no_header,
        })
    }

    // The query comes from -e, the config file or stdin, in that order.
    fn resolve_query(args: &SqlCsvArgs, external_conf: &ExternalConfig) -> Result<String, DynError> {
        let empty = String::new();
        let query = args_or_external_opt_default!(&args, &external_conf, execute, &empty);
        if !query.trim().is_empty() {
            return Ok(query.to_string());
        }
        if io::stdin().is_terminal() {
            return Err(Box::new(ConfigError::new("A query must be provided")));
        }
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        if buf.trim().is_empty() {
            return Err(Box::new(ConfigError::new("A query must be provided")));
        }
        Ok(buf)
    }

    fn format_connection_string(&self, password: &str) -> String {
        let mut conn_str = format!(
            "Driver={{{}}};Server={};Port={};Database={};Uid={};",
            self.driver, self.host, self.port, self.database, self.user
        );
        if !password.is_empty() {
            conn_str.push_str(&format!("Pwd={};", password));
        }
        conn_str
    }

    pub fn connection_string(&self) -> String {
        self.format_connection_string(&self.password)
    }

    /// Same as connection_string() but with the password masked, safe to log
    /// or include in error messages.
    pub fn redacted_connection_string(&self) -> String {
        if self.password.is_empty() {
            self.format_connection_string("")
        } else {
            self.format_connection_string("******")
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn output_template(&self) -> &str {
        &self.output_template
    }

    pub fn no_header(&self) -> bool {
        self.no_header
    }
}
