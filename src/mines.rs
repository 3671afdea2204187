use log::info;

use crate::db::{Mine, MineFields};
use crate::error::{CoreError, CoreResult, StoreContext};
use crate::store::MineStore;

const MINE: &str = "mine";

pub struct Mines<'s, S> {
    store: &'s mut S,
}

impl<'s, S: MineStore> Mines<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    pub fn create(&mut self, fields: MineFields) -> CoreResult<Mine> {
        let mine = self.store.insert_mine(fields)
            .during("create", MINE, None)?;
        info!("Created mine {} ({})", mine.id, mine.name);
        Ok(mine)
    }

    pub fn get(&mut self, id: i32) -> CoreResult<Mine> {
        self.store.get_mine(id)
            .during("fetch", MINE, Some(id))?
            .ok_or_else(|| CoreError::not_found(MINE, id))
    }

    pub fn list(&mut self) -> CoreResult<Vec<Mine>> {
        self.store.list_mines()
            .during("list", "mines", None)
    }

    pub fn update(&mut self, id: i32, fields: MineFields) -> CoreResult<Mine> {
        let updated = self.store.update_mine(id, fields)
            .during("update", MINE, Some(id))?;
        if updated == 0 {
            return Err(CoreError::not_found(MINE, id));
        }
        info!("Updated mine {}", id);
        self.get(id)
    }

    /// Removes the mine along with every emission record and mining operation that belongs to it.
    pub fn delete(&mut self, id: i32) -> CoreResult<()> {
        let deleted = self.store.delete_mine_cascade(id)
            .during("delete", MINE, Some(id))?;
        if deleted == 0 {
            return Err(CoreError::not_found(MINE, id));
        }
        info!("Deleted mine {} and its records", id);
        Ok(())
    }
}
