use anyhow::Result;

use crate::contacts::{ContactDirectory, PermissionState};

pub fn status(directory: &ContactDirectory) -> Result<()> {
    report(directory, directory.permission_state());
    Ok(())
}

pub fn request(directory: &ContactDirectory) -> Result<()> {
    report(directory, directory.request_permission());
    Ok(())
}

fn report(directory: &ContactDirectory, state: PermissionState) {
    let source = directory.source();
    println!("{} ({}): {}", source.id(), source.description(), state.as_str());
    if state == PermissionState::QueryFailed {
        println!("Could not query contact permissions. Run with RUST_LOG=debug for details.");
    }
}
