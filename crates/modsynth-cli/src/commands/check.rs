//! Patch validation.

use std::collections::BTreeMap;

use clap::Args;
use modsynth_config::SynthConfig;
use modsynth_patch::{PatchNode, write_patch};

use super::common::PatchArg;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    patch: PatchArg,

    /// Print the patch back in canonical form
    #[arg(long)]
    print: bool,
}

pub fn run(args: CheckArgs, config: &SynthConfig) -> anyhow::Result<()> {
    let patch = args.patch.load()?;
    let graph = patch.build(config.sample_rate, config.period_size)?;

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for node in patch.nodes() {
        *kinds.entry(node.kind().code()).or_default() += 1;
    }
    let constants = patch
        .nodes()
        .iter()
        .filter(|n| matches!(n, PatchNode::Constant { .. }))
        .count();
    let surfaced = graph.control_panel().surfaced().count();

    println!("{}: OK", args.patch.display_name());
    println!("  {} nodes, {} outputs", graph.len(), graph.output_nodes().count());
    let summary: Vec<String> = kinds.iter().map(|(k, n)| format!("{n} {k}")).collect();
    println!("  kinds: {}", summary.join(", "));
    println!("  constants: {constants} ({surfaced} surfaced)");

    if args.print {
        println!();
        print!("{}", write_patch(&graph));
    }
    Ok(())
}
