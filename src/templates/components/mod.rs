pub mod card;

pub use card::{card, count_list};
