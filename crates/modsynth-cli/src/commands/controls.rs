//! Lists the constants a patch exposes to a control surface.

use clap::Args;
use modsynth_config::SynthConfig;

use super::common::PatchArg;

#[derive(Args)]
pub struct ControlsArgs {
    #[command(flatten)]
    patch: PatchArg,

    /// Include constants tagged NDS (not displayed)
    #[arg(short, long)]
    all: bool,
}

pub fn run(args: ControlsArgs, config: &SynthConfig) -> anyhow::Result<()> {
    let graph = args
        .patch
        .load()?
        .build(config.sample_rate, config.period_size)?;
    let panel = graph.control_panel();

    println!("Controls in {}", args.patch.display_name());
    println!("{:>5}  {:<4} {:>12}  {:>5}  LABEL", "ID", "CAT", "INITIAL", "KNOB");

    let mut shown = 0;
    for id in 0..panel.node_count() {
        let Some(category) = panel.category(id) else {
            continue;
        };
        if !args.all && !category.is_surfaced() {
            continue;
        }
        let initial = panel.initial_value(id).unwrap_or_default();
        println!(
            "{id:>5}  {:<4} {:>12}  {:>5.3}  {}",
            category.code(),
            category.display(initial).to_string(),
            category.to_knob(initial),
            panel.label(id).unwrap_or_default(),
        );
        shown += 1;
    }
    if shown == 0 {
        println!("  (none)");
    }
    Ok(())
}
