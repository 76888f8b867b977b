use anyhow::Result;
use dialogger::app::handler;

fn main() -> Result<()> {
    handler::init()
}
