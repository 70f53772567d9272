mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, info, scan, sweep};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    print::banner();

    match commands.command {
        Commands::Info { prefix } => info::info(prefix),
        Commands::Discover(args) => {
            print::header("getting ready for discovery");
            discover::discover(args).await
        }
        Commands::Scan { target, scan } => {
            print::header("starting scanner");
            scan::scan(target, scan).await
        }
        Commands::Sweep { discovery, scan } => {
            print::header("starting sweep");
            sweep::sweep(discovery, scan).await
        }
    }
}
