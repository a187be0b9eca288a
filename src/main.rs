// main.rs
#[macro_use]
extern crate log;

use std::io::{self, BufRead};
use std::process;

use structopt::StructOpt;

use log_alerter::alert;
use log_alerter::alerter::Alerter;
use log_alerter::config::{Args, Config};
use log_alerter::error::Chain;

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load(Args::from_args()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", Chain(&error));
            eprintln!("Press enter to exit.");
            io::stdin().lock().read_line(&mut String::new())?;
            process::exit(1);
        }
    };

    debug!("Sending alerts via {}", config.method.name());
    let service = alert::build(&config.method)?;

    // `Alerter::new` logs its own errors.
    let alerter = match Alerter::new(&config.log_file, service) {
        Ok(alerter) => alerter,
        Err(_) => process::exit(1),
    };

    alerter.run(config.keep_alive)
}
