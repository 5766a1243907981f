use anyhow::Result;

fn main() -> Result<()> {
    println!("{}", linkfeed::linkfeed::openapi().to_pretty_json()?);
    Ok(())
}
