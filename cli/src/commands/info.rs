use anyhow::Context;
use seekr_common::config::Config;

use crate::commands;
use crate::terminal::{format, print};

pub fn info(prefix: u8) -> anyhow::Result<()> {
    let config = Config {
        prefix_len: prefix,
        ..Config::default()
    };
    let mut coordinator = commands::coordinator(config)?;
    let ctx = coordinator
        .identify()
        .context("failed to resolve the local network identity")?;

    print::header("local identity");
    print::tree_head(0, "this device");
    print::as_tree_one_level(format::context_to_details(&ctx));
    Ok(())
}
