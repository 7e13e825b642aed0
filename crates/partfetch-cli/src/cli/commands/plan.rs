//! `partfetch plan <size> <segments>` – print a range plan without downloading.

use anyhow::Result;
use partfetch_core::plan_segments;

pub fn run_plan(size: u64, segments: usize) -> Result<()> {
    let plan = plan_segments(size, segments)?;
    println!("{:>6}  {:>12}  {:>12}  {:>12}  {}", "Seg", "Start", "End", "Bytes", "Range");
    for seg in &plan {
        println!(
            "{:>6}  {:>12}  {:>12}  {:>12}  {}",
            seg.index,
            seg.start,
            seg.end,
            seg.len(),
            seg.range_header_value()
        );
    }
    Ok(())
}
