pub mod roster;
pub mod skills;
