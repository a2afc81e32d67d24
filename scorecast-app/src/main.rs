//! Scorecast operator console.

fn main() -> anyhow::Result<()> {
    scorecast_lib::run()
}
