mod key;
mod map;
pub mod version;

pub use self::key::ResourceKey;
pub use self::map::ResourceMap;
