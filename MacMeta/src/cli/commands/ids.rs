//! CLI commands for UUIDs and localization handles

use crate::mods::{from_handle, new_handle, new_uuid, to_handle};

/// Print `count` random UUIDs
pub fn uuid(count: usize) -> anyhow::Result<()> {
    for _ in 0..count {
        println!("{}", new_uuid());
    }
    Ok(())
}

/// Print random handles, or convert one value between handle and UUID
pub fn handle(count: usize, from_uuid: Option<&str>, to_uuid: Option<&str>) -> anyhow::Result<()> {
    if let Some(uuid) = from_uuid {
        println!("{}", to_handle(uuid)?);
        return Ok(());
    }
    if let Some(handle) = to_uuid {
        println!("{}", from_handle(handle)?);
        return Ok(());
    }

    for _ in 0..count {
        println!("{}", new_handle());
    }
    Ok(())
}
