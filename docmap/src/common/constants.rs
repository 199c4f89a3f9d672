// document constants
pub const DOC_ID: &str = "_id";
pub const ID_ALIAS: &str = "id";
pub const FIELD_SEPARATOR: char = '.';

// operator tokens understood by the store
pub const OP_SET: &str = "$set";
pub const OP_UNSET: &str = "$unset";
pub const OP_INC: &str = "$inc";
pub const OP_PUSH: &str = "$push";
pub const OP_PUSH_ALL: &str = "$pushAll";
pub const OP_POP: &str = "$pop";
pub const OP_PULL: &str = "$pull";
pub const OP_PULL_ALL: &str = "$pullAll";
pub const OP_BIT: &str = "$bit";

// snapshot constants
pub const SNAPSHOT_VERSION: u32 = 1;
