pub mod store;

pub use crate::store::{HabitStore, HabitStoreBuilder};
