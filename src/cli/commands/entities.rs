use crate::entities::schemas;

pub fn handle() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&schemas())?);
    Ok(())
}
