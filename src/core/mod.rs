pub mod game;
pub mod page;

pub use game::{Game, NewGame};
pub use page::{GamePage, ListFilters, PageRequest};
