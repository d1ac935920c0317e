pub mod mongodb;

pub use self::mongodb::MongoDB;
