use anyhow::Result;

use crate::contacts::ContactDirectory;
use crate::store::NoteStore;

pub fn run(store: &NoteStore, directory: &ContactDirectory) -> Result<()> {
    let notes = store.count()?;
    let contacts = directory.list_all()?.len();
    let permission = directory.permission_state();

    println!("Notes:      {}", notes);
    println!("Contacts:   {}", contacts);
    println!("Permission: {}", permission.as_str());
    Ok(())
}
